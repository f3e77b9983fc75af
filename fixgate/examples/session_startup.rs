/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session startup example.
//!
//! Reads a QuickFIX-style settings file and creates every configured session.
//!
//! ```text
//! cargo run --example session_startup -- sessions.cfg [schema-dir]
//! ```
//!
//! Without arguments a two-session demo configuration is written to a
//! temporary directory and used instead.
use anyhow::{Context, Result};
use chrono::Utc;
use fixgate::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const FIX44: &str = r#"<fix major="4" minor="4">
  <header><field name="BeginString" required="Y"/></header>
  <fields><field number="8" name="BeginString" type="STRING"/></fields>
</fix>"#;
const FIXT11: &str = r#"<fix type="FIXT" major="1" minor="1" servicepack="0">
  <fields><field number="1128" name="ApplVerID" type="STRING"/></fields>
</fix>"#;
const FIX50SP2: &str = r#"<fix major="5" minor="0" servicepack="2">
  <fields><field number="11" name="ClOrdID" type="STRING"/></fields>
</fix>"#;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

fn write_demo(dir: &Path) -> Result<PathBuf> {
    for (name, xml) in [
        ("FIX44.xml", FIX44),
        ("FIXT11.xml", FIXT11),
        ("FIX50SP2.xml", FIX50SP2),
    ] {
        std::fs::write(dir.join(name), xml).with_context(|| format!("writing {name}"))?;
    }
    let settings = format!(
        "[DEFAULT]\n\
         ConnectionType=initiator\n\
         HeartBtInt=30\n\
         StartTime=00:00:00\n\
         EndTime=23:59:59\n\
         \n\
         [SESSION]\n\
         BeginString=FIX.4.4\n\
         SenderCompID=CLIENT\n\
         TargetCompID=BROKER\n\
         DataDictionary={fix44}\n\
         \n\
         [SESSION]\n\
         BeginString=FIXT.1.1\n\
         SenderCompID=CLIENT\n\
         TargetCompID=VENUE\n\
         TransportDataDictionary={fixt11}\n\
         DefaultApplVerID=FIX.5.0SP2\n",
        fix44 = dir.join("FIX44.xml").display(),
        fixt11 = dir.join("FIXT11.xml").display(),
    );
    let path = dir.join("sessions.cfg");
    std::fs::write(&path, settings).context("writing sessions.cfg")?;
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let demo_dir = tempfile::tempdir()?;
    let (settings_path, schema_dir) = match args.next() {
        Some(path) => (
            PathBuf::from(path),
            args.next().map_or_else(PathBuf::new, PathBuf::from),
        ),
        None => (write_demo(demo_dir.path())?, demo_dir.path().to_path_buf()),
    };

    let settings = SessionSettings::from_file(&settings_path)
        .with_context(|| format!("reading {}", settings_path.display()))?;
    let stores = Arc::new(MemoryStoreFactory::new());
    let factory = SessionFactory::builder(Arc::new(NoOpApplication), stores.clone())
        .with_log_factory(Arc::new(TracingLogFactory))
        .with_schema_directory(schema_dir)
        .build();

    let sessions = factory.create_all(&settings)?;
    let now = Utc::now();
    for session in &sessions {
        let schemas = session.schemas();
        info!(
            session = %session.session_id(),
            family = schemas.family().name(),
            appl_ver_ids = ?schemas.appl_ver_ids(),
            in_schedule = session.is_session_time(now),
            "session ready"
        );
        session.notify_created().await;
    }
    info!(
        sessions = sessions.len(),
        schemas = factory.cache().len(),
        stores_opened = stores.open_count(),
        "startup complete"
    );
    Ok(())
}
