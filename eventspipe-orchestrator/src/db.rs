use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create pipeline definitions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_definitions (
            id UUID PRIMARY KEY,
            event VARCHAR(256) NOT NULL,
            filters JSONB NOT NULL DEFAULT '{}',
            options JSONB NOT NULL DEFAULT '{}',
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create task definitions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_definitions (
            id UUID PRIMARY KEY,
            function VARCHAR(512) NOT NULL UNIQUE,
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create task bindings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS task_bindings (
            id UUID PRIMARY KEY,
            definition_id UUID NOT NULL REFERENCES pipeline_definitions(id) ON DELETE CASCADE,
            task_definition_id UUID NOT NULL REFERENCES task_definitions(id) ON DELETE CASCADE,
            ordering INTEGER NOT NULL DEFAULT 20,
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create pipelines table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipelines (
            id UUID PRIMARY KEY,
            name VARCHAR(128) NOT NULL,
            node VARCHAR(256) NOT NULL DEFAULT 'undefined',
            status INTEGER NOT NULL DEFAULT 3,
            definition_id UUID REFERENCES pipeline_definitions(id) ON DELETE SET NULL,
            tasks_count INTEGER NOT NULL DEFAULT 0,
            current_task INTEGER NOT NULL DEFAULT 0,
            principal VARCHAR(256) NOT NULL,
            start_ts TIMESTAMPTZ NOT NULL,
            end_ts TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create tasks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id UUID PRIMARY KEY,
            pipeline_id UUID NOT NULL REFERENCES pipelines(id) ON DELETE CASCADE,
            binding_id UUID REFERENCES task_bindings(id) ON DELETE SET NULL,
            position INTEGER NOT NULL DEFAULT 0,
            status INTEGER NOT NULL DEFAULT 3,
            node VARCHAR(256) NOT NULL DEFAULT 'undefined',
            start_ts TIMESTAMPTZ,
            end_ts TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create pipeline logs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_logs (
            id BIGSERIAL PRIMARY KEY,
            pipeline_id UUID NOT NULL REFERENCES pipelines(id) ON DELETE CASCADE,
            timestamp TIMESTAMPTZ NOT NULL,
            message TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create event schedules table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_schedules (
            id UUID PRIMARY KEY,
            event JSONB NOT NULL DEFAULT '{}',
            principal VARCHAR(256) NOT NULL,
            enabled BOOLEAN NOT NULL DEFAULT FALSE,
            minute VARCHAR(240) NOT NULL DEFAULT '*',
            hour VARCHAR(96) NOT NULL DEFAULT '*',
            day_of_month VARCHAR(124) NOT NULL DEFAULT '*',
            month_of_year VARCHAR(64) NOT NULL DEFAULT '*',
            day_of_week VARCHAR(64) NOT NULL DEFAULT '*',
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create artifacts tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artifacts (
            id UUID PRIMARY KEY,
            data BYTEA NOT NULL,
            checksum VARCHAR(64) NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_artifacts (
            id UUID PRIMARY KEY,
            pipeline_id UUID NOT NULL REFERENCES pipelines(id) ON DELETE CASCADE,
            artifact_id UUID NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
            file_name VARCHAR(1024) NOT NULL DEFAULT 'undefined',
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_definitions_event ON pipeline_definitions(event, enabled)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_task_bindings_definition ON task_bindings(definition_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pipelines_status ON pipelines(status)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pipelines_start_ts ON pipelines(start_ts DESC)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_pipeline ON tasks(pipeline_id, position)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_logs_pipeline ON pipeline_logs(pipeline_id, id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_event_schedules_enabled ON event_schedules(enabled)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_artifacts_pipeline ON pipeline_artifacts(pipeline_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
