//! Run one query through the bridge and print the rows.
//!
//! ```text
//! BRIDGE_CONN="server=localhost;port=8991;host=trino;port=8080;user=alice;catalog=tpch;schema=tiny" \
//!     cargo run --example query -- "SELECT nationkey, name FROM nation"
//! ```

use trino_bridge_rs::{Connection, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    dotenvy::from_path("tests/.env").ok();

    let conn_str = std::env::var("BRIDGE_CONN").unwrap_or_else(|_| {
        "server=localhost;port=8991;host=trino;port=8080;user=trino;catalog=tpch;schema=tiny"
            .to_string()
    });
    let sql = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "SELECT nationkey, name FROM nation".to_string());

    let conn = Connection::new(&conn_str);
    let status = conn.server_status().await?;
    println!("Bridge {} {} ({})", status.name, status.version, status.status);

    conn.open().await?;
    println!("Session {}", conn.session_id().unwrap_or_default());

    let mut stmt = conn.create_statement();
    stmt.set_command_text(sql).await;

    let mut reader = stmt.execute().await?;
    let names = (0..reader.field_count())
        .map(|i| reader.column_name(i).map(str::to_string))
        .collect::<Result<Vec<_>>>()?;
    println!("{}", names.join(" | "));

    let mut count = 0;
    while reader.read().await? {
        let cells = (0..reader.field_count())
            .map(|i| reader.value(i).map(ToString::to_string))
            .collect::<Result<Vec<_>>>()?;
        println!("{}", cells.join(" | "));
        count += 1;
    }
    println!("Total rows: {}", count);
    reader.close().await;

    conn.close().await?;
    Ok(())
}
