use smsclub::{ConnectorSettings, ConnectorStatus, MessageText, Msisdn, SendSms, SmsClubConnector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = ConnectorSettings {
        enabled: true,
        username: std::env::var("SMSCLUB_USER").unwrap_or_default(),
        password: std::env::var("SMSCLUB_PASSWORD").unwrap_or_default(),
    };

    let mut connector = SmsClubConnector::new(settings);
    let spec = connector.spec();
    println!("connector: {} (by {})", spec.name(), spec.author());
    println!("status: {:?}", spec.status());
    println!(
        "capabilities: send={} preferences={} update={}",
        spec.capabilities().send,
        spec.capabilities().preferences,
        spec.capabilities().update
    );
    for sub in spec.sub_connectors() {
        println!(
            "route: {} (multi-recipients: {})",
            sub.id, sub.multi_recipients
        );
    }

    if spec.status() != ConnectorStatus::Ready {
        println!("set SMSCLUB_USER and SMSCLUB_PASSWORD to reach the ready state");
        return Ok(());
    }

    if let Ok(recipient_raw) = std::env::var("SMSCLUB_RECIPIENT") {
        let request = SendSms::to_one(
            Msisdn::new(recipient_raw)?,
            MessageText::new("Hello from the smsclub connector demo.")?,
        );
        match connector.send(request).await {
            Ok(response) => println!("sent, {} confirmation(s)", response.okays.len()),
            Err(err) => println!("send failed: {err}"),
        }
        println!("balance: {:?}", connector.balance());
    } else {
        println!("set SMSCLUB_RECIPIENT to send a test message");
    }

    Ok(())
}
