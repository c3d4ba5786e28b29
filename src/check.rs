use std::path::Path;

use log::{info, warn};

use crate::{
    config::Config,
    connect,
    db::{capture_live_schema, DbClient},
    diff::{diff, Discrepancy},
    errors::DbError,
    snapshot::load_snapshot,
};

/// Result of comparing the snapshot with the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Match,
    Drift(Vec<Discrepancy>),
}

impl CheckOutcome {
    pub fn from_discrepancies(discrepancies: Vec<Discrepancy>) -> Self {
        if discrepancies.is_empty() {
            CheckOutcome::Match
        } else {
            CheckOutcome::Drift(discrepancies)
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, CheckOutcome::Match)
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CheckOutcome::Match => 0,
            CheckOutcome::Drift(_) => 1,
        }
    }

    pub fn report(&self) -> String {
        match self {
            CheckOutcome::Match => {
                "Schema file matches live database (tables/columns/types).".to_string()
            }
            CheckOutcome::Drift(discrepancies) => {
                let mut out = String::from("SCHEMA DRIFT DETECTED:");
                for d in discrepancies {
                    out.push_str(&format!("\n- {}", d));
                }
                out
            }
        }
    }
}

/// Loads the snapshot, captures the live schema and prints the comparison.
///
/// The snapshot is read first so a broken artifact is reported without
/// touching the database.
pub async fn run_check<C>(snapshot_path: &Path, client: &C) -> Result<CheckOutcome, DbError>
where
    C: DbClient + ?Sized,
{
    let snapshot = load_snapshot(snapshot_path)?;
    let live = capture_live_schema(client).await?;

    let outcome = CheckOutcome::from_discrepancies(diff(&snapshot, &live));
    if let CheckOutcome::Drift(discrepancies) = &outcome {
        info!("{} discrepancies found", discrepancies.len());
    }
    println!("{}", outcome.report());
    Ok(outcome)
}

/// Runs the check described by `config`.
///
/// Without a connection string the snapshot is still parsed, so a broken or
/// missing artifact is reported ahead of the configuration error.
pub async fn check_with_config(config: &Config) -> Result<CheckOutcome, DbError> {
    if let Err(e) = config.require_database_url() {
        warn!("Skipping live check; validating the snapshot only");
        load_snapshot(&config.snapshot_path)?;
        return Err(e);
    }

    let client = connect(config).await?;
    let outcome = run_check(&config.snapshot_path, &client).await;
    client.close().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mocks::{client_with, MockCatalog};
    use crate::models::schema::{Schema, Table};
    use crate::snapshot::write_snapshot;
    use tempfile::tempdir;

    fn offline_config(snapshot_path: &Path) -> Config {
        let path = snapshot_path.to_string_lossy().into_owned();
        Config::from_lookup(|key| (key == "SCHEMA_SNAPSHOT_PATH").then(|| path.clone()))
    }

    #[tokio::test]
    async fn test_empty_snapshot_and_empty_database_match() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        write_snapshot(&Schema::new(), &path).unwrap();

        let outcome = run_check(&path, &client_with(vec![])).await.unwrap();

        assert!(outcome.is_match());
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_drift_is_reported_with_exit_code_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        let snapshot: Schema = vec![
            Table::new("users")
                .with_column("id", "integer")
                .with_column("email", "text"),
            Table::new("legacy"),
        ]
        .into_iter()
        .collect();
        write_snapshot(&snapshot, &path).unwrap();

        let client = client_with(vec![(
            "users",
            vec![("id", "integer"), ("email", "character varying")],
        )]);
        let outcome = run_check(&path, &client).await.unwrap();

        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(
            outcome.report(),
            "SCHEMA DRIFT DETECTED:\n\
             - legacy: table missing in live database\n\
             - users.email: type mismatch snapshot=text live=character varying"
        );
    }

    #[tokio::test]
    async fn test_broken_snapshot_fails_before_querying() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        std::fs::write(&path, "TABLE LIST:\n- users\n").unwrap();

        let mut client = MockCatalog::new();
        client.expect_list_tables().never();
        client.expect_list_columns().never();

        let result = run_check(&path, &client).await;

        assert!(matches!(result, Err(DbError::Parse(_))));
    }

    #[tokio::test]
    async fn test_catalog_failure_is_not_drift() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        write_snapshot(&Schema::new(), &path).unwrap();

        let mut client = MockCatalog::new();
        client
            .expect_list_tables()
            .returning(|| Err(DbError::Sqlx(sqlx::Error::PoolTimedOut)));

        let err = run_check(&path, &client).await.unwrap_err();

        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_match_report() {
        assert_eq!(
            CheckOutcome::from_discrepancies(Vec::new()).report(),
            "Schema file matches live database (tables/columns/types)."
        );
    }

    #[tokio::test]
    async fn test_offline_check_with_valid_snapshot_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        write_snapshot(&Schema::new(), &path).unwrap();

        let err = check_with_config(&offline_config(&path)).await.unwrap_err();

        assert!(matches!(err, DbError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_offline_check_reports_broken_snapshot_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        std::fs::write(&path, "DETAILED SCHEMA DATA:\n{\"tables\": [").unwrap();

        let err = check_with_config(&offline_config(&path)).await.unwrap_err();

        assert!(matches!(err, DbError::Parse(_)));
    }

    #[tokio::test]
    async fn test_offline_check_reports_missing_snapshot() {
        let dir = tempdir().unwrap();

        let err = check_with_config(&offline_config(&dir.path().join("absent.txt")))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
