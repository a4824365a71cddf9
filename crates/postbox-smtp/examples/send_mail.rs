//! Send a message with optional attachments
//!
//! Usage: send_mail <host> <port> <sender> <password> <recipients,...> <subject> [files...]
use postbox_smtp::{Mailer, Outgoing};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("postbox_smtp=debug".parse()?))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 6 {
        anyhow::bail!(
            "usage: send_mail <host> <port> <sender> <password> <recipients,...> <subject> [files...]"
        );
    }

    let mut mailer = Mailer::new(&args[0], args[1].parse()?);
    mailer.set_sender(&args[2], &args[3]);
    mailer.set_recipients(args[4].split(',').map(str::trim));

    let outgoing = args[6..].iter().fold(
        Outgoing::new(&args[5])
            .body("Sent by postbox.")
            .inline_attachment("sent-by.txt", b"postbox send_mail example".to_vec()),
        |outgoing, path| outgoing.file_attachment(path),
    );

    mailer.send(&outgoing).await?;
    println!("Sent to {}", args[4]);
    Ok(())
}
