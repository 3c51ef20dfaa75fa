//! genz monitor - watch kobject uevents.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use clap::Args;
use genz_netlink::netlink::UeventSource;
use genz_netlink::{Error, RecvMode, UeventListener, UeventRecord};

#[derive(Args)]
pub struct MonitorCmd {
    /// Poll without waiting, draining the queue on every interval.
    #[arg(long)]
    nonblocking: bool,

    /// Drain interval in milliseconds (with --nonblocking).
    #[arg(long, default_value_t = 1000, value_name = "MS")]
    interval: u64,

    /// Only show events from this subsystem.
    #[arg(short = 's', long)]
    subsystem: Option<String>,
}

impl MonitorCmd {
    pub async fn run(&self, json: bool) -> anyhow::Result<()> {
        let mode = if self.nonblocking {
            RecvMode::NonBlocking
        } else {
            RecvMode::Blocking
        };
        let mut listener = UeventListener::open(mode)?;

        let close = listener.close_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                close.close();
            }
        });

        eprintln!("Monitoring uevents (Ctrl+C to stop)...");

        if self.nonblocking {
            self.drain_loop(&listener, json).await
        } else {
            self.poll_loop(&mut listener, json).await
        }
    }

    async fn poll_loop(&self, listener: &mut UeventListener, json: bool) -> anyhow::Result<()> {
        let stdout = std::io::stdout();

        loop {
            match listener.poll().await {
                Ok(Some(record)) => self.print(&mut stdout.lock(), &record, json)?,
                Ok(None) => {}
                Err(Error::Closed) => return Ok(()),
                Err(e @ Error::MalformedEvent { .. }) => tracing::warn!("{}", e),
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn drain_loop(&self, listener: &UeventListener, json: bool) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(Duration::from_millis(self.interval.max(1)));
        let mut stdout = std::io::stdout();

        loop {
            ticker.tick().await;

            let records = match listener.drain(0) {
                Ok(records) => records,
                Err(Error::Closed) => return Ok(()),
                Err(e) => return Err(e.into()),
            };

            if records.is_empty() {
                write!(stdout, ".")?;
                stdout.flush()?;
                continue;
            }

            let mut out = stdout.lock();
            for record in &records {
                self.print(&mut out, record, json)?;
            }
        }
    }

    fn print(&self, out: &mut impl Write, record: &UeventRecord, json: bool) -> anyhow::Result<()> {
        if let Some(subsystem) = &self.subsystem
            && record.subsystem() != Some(subsystem.as_str())
        {
            return Ok(());
        }

        if json {
            writeln!(out, "{}", serde_json::json!(record))?;
            return Ok(());
        }

        let source = match record.source {
            UeventSource::KernelDirect => "KERNEL",
            UeventSource::LibudevRelay => "UDEV",
        };
        let header = record.header_text().unwrap_or("-");
        writeln!(out, "{} {} ({} bytes header)", source, header, record.header.len())?;

        let fields: BTreeMap<_, _> = record.fields.iter().collect();
        for (key, value) in fields {
            writeln!(out, "    {}={}", key, value)?;
        }

        Ok(())
    }
}
