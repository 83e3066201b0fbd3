use anyhow::Result;
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::Deserialize;

use analytics_domain::ports::VisitRepository;
use analytics_domain::VisitRecord;

#[derive(Debug, Deserialize, Row)]
struct VisitRow {
    id: i64,
    ip_address: Option<String>,
    user_agent: Option<String>,
    device_type: Option<String>,
    visited_at: Option<String>,
}

impl From<VisitRow> for VisitRecord {
    fn from(row: VisitRow) -> Self {
        VisitRecord {
            id: row.id,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            device_type: row.device_type,
            visited_at: row.visited_at,
        }
    }
}

#[derive(Clone)]
pub struct ClickhouseVisitRepo {
    client: Client,
    database: String,
    table: String,
}

impl ClickhouseVisitRepo {
    /// `database` and `table` must already be validated identifiers.
    pub fn new(client: Client, database: String, table: String) -> Self {
        Self {
            client,
            database,
            table,
        }
    }

    // Timestamps are rendered in UTC so the naive text parses to the same
    // instant whatever the server timezone is.
    fn select_query(&self) -> String {
        format!(
            "SELECT toInt64(id), toNullable(ip_address), toNullable(user_agent), \
             toNullable(device_type), toNullable(toString(visited_at, 'UTC')) \
             FROM {}.{} ORDER BY id DESC",
            self.database, self.table
        )
    }
}

#[async_trait]
impl VisitRepository for ClickhouseVisitRepo {
    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }

    async fn fetch_visits(&self) -> Result<Vec<VisitRecord>> {
        let rows = self
            .client
            .query(&self.select_query())
            .fetch_all::<VisitRow>()
            .await?;
        Ok(rows.into_iter().map(VisitRecord::from).collect())
    }
}
