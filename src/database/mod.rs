use mongodb::{bson::doc, Client, Collection, Database};
use std::error::Error;
use std::time::Duration;

const DEFAULT_DATABASE: &str = "mydatabase";

/// Shared MongoDB handle, opened once at startup and cloned into every worker
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(timeout);
        client_options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(client_options)?;
        let db = client.database(database_name(uri));

        let mongodb = Self { db };
        mongodb.ping().await?;

        Ok(mongodb)
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Round-trip to the server; run once at startup so a bad URI fails fast
    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

/// Database name is the URI path segment, e.g. `mongodb://host:27017/mydatabase?retryWrites=true`.
fn database_name(uri: &str) -> &str {
    let without_scheme = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);

    without_scheme
        .split_once('/')
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DATABASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_name_from_uri() {
        assert_eq!(database_name("mongodb://mongo-db:27017/mydatabase"), "mydatabase");
        assert_eq!(
            database_name("mongodb+srv://u:p@cluster.example.net/people?retryWrites=true"),
            "people"
        );
        assert_eq!(database_name("mongodb://localhost:27017"), DEFAULT_DATABASE);
        assert_eq!(database_name("mongodb://localhost:27017/"), DEFAULT_DATABASE);
        assert_eq!(database_name("mongodb://localhost:27017/?authSource=admin"), DEFAULT_DATABASE);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/user_service_test".to_string());

        let db = MongoDB::new(&uri, Duration::from_secs(2)).await;
        assert!(db.is_ok());
    }
}
