use std::io;

use smsclub::{Credentials, MessageText, Msisdn, SendSms, SmsClubClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::var("SMSCLUB_USER").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSCLUB_USER environment variable is required",
        )
    })?;
    let password = std::env::var("SMSCLUB_PASSWORD").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSCLUB_PASSWORD environment variable is required",
        )
    })?;
    let recipient_raw = std::env::var("SMSCLUB_RECIPIENT").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSCLUB_RECIPIENT environment variable is required",
        )
    })?;
    let message = std::env::var("SMSCLUB_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smsclub demo.".to_owned());

    let client = SmsClubClient::new(Credentials::new(username, password)?);
    let recipient = Msisdn::new(recipient_raw)?;
    let text = MessageText::new(message)?;
    let request = SendSms::to_one(recipient, text);

    let response = client.send_sms(request).await?;
    println!("credit: {:?}", response.credit);
    for okay in &response.okays {
        println!(
            "accepted: message_id={:?} msisdn={:?} notiflink={:?}",
            okay.message_id(),
            okay.msisdn(),
            okay.notiflink.as_ref().map(|link| link.as_str())
        );
    }

    Ok(())
}
