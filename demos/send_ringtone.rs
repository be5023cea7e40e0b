// ABOUTME: Example application sending a Nokia ring tone through a GSM modem in PDU mode
// ABOUTME: Talks to the modem over a serial-to-TCP bridge using Connection and Modem

use argh::FromArgs;
use gsm_sms::codec::decode_hex;
use gsm_sms::connection::Connection;
use gsm_sms::datatypes::Address;
use gsm_sms::message::SmsMessage;
use gsm_sms::modem::{Modem, ModemLink, ModemOptions};
use std::error::Error;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Send a ring tone (OTA bitmap, hex coded) to a phone through a GSM modem
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the hostname or IP address of the serial bridge (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the TCP port of the serial bridge (default: 7000)
    #[argh(option, short = 'p')]
    port: Option<u32>,

    /// the recipient telephone number
    #[argh(option, short = 't')]
    to: String,

    /// the ring tone data as a hex string
    #[argh(option, short = 'r')]
    ring_tone: String,

    /// SMSC number to use instead of the one stored in the modem
    #[argh(option)]
    smsc: Option<String>,

    /// bytes sent after the PDU, hex coded (default: 1A)
    #[argh(option)]
    terminator: Option<String>,

    /// seconds to wait for each modem response (default: 30)
    #[argh(option)]
    timeout: Option<u64>,
}

/// Send a plain AT command and wait for its final `OK`
async fn command<L: ModemLink>(link: &mut L, command: &str) -> Result<(), Box<dyn Error>> {
    link.write(format!("{command}\r").as_bytes()).await?;
    loop {
        let line = link.read_line().await?;
        match line.as_str() {
            "OK" => return Ok(()),
            "ERROR" => return Err(format!("{command} failed").into()),
            // echo or intermediate result
            _ => continue,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let level = if cli_args.debugging {
        Level::TRACE
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let host = cli_args.host.unwrap_or_else(|| "localhost".to_owned());
    let port = cli_args.port.unwrap_or(7000);
    let timeout = Duration::from_secs(cli_args.timeout.unwrap_or(30));

    let mut options = ModemOptions::default().with_await_final_ok(true);
    if let Some(smsc) = &cli_args.smsc {
        options = options.with_smsc_address(Address::new(smsc)?);
    }
    if let Some(terminator) = &cli_args.terminator {
        options = options.with_terminator_hex(terminator)?;
    }

    let message = SmsMessage::ring_tone(Address::new(&cli_args.to)?, decode_hex(&cli_args.ring_tone)?);

    let socket = TcpStream::connect(format!("{host}:{port}")).await?;
    let mut connection = Connection::new(socket).with_read_timeout(timeout);

    // Echo off so the prompt is the first thing after AT+CMGS, then PDU mode
    command(&mut connection, "ATE0").await?;
    command(&mut connection, "AT+CMGF=0").await?;

    let mut modem = Modem::with_options(connection, options);
    match modem.send_message(&message).await {
        Ok(receipts) => {
            for (index, receipt) in receipts.iter().enumerate() {
                match receipt.message_reference {
                    Some(reference) => println!("Segment {} sent, reference {reference}", index + 1),
                    None => println!("Segment {} sent", index + 1),
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to send ring tone: {e}");
            Err(e.into())
        }
    }
}
