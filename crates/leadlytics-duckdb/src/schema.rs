/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `LEADLYTICS_DUCKDB_MEMORY`, default `"1GB"`).
///
/// Stage flags live on `pipeline_stages` rather than on `leads`: won / lost is
/// derived per query from the pipeline's current close stages.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- ORGANIZATIONS (tenant scope)
-- ===========================================
CREATE TABLE IF NOT EXISTS organizations (
    id              VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ===========================================
-- PIPELINES + STAGE TAXONOMY
-- ===========================================
CREATE TABLE IF NOT EXISTS pipelines (
    id              VARCHAR PRIMARY KEY,
    organization_id VARCHAR NOT NULL,
    name            VARCHAR NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_pipelines_org ON pipelines(organization_id);

CREATE TABLE IF NOT EXISTS pipeline_stages (
    pipeline_id     VARCHAR NOT NULL,
    position        BIGINT NOT NULL,               -- order within its kind
    name            VARCHAR NOT NULL,
    color           VARCHAR,
    kind            VARCHAR NOT NULL,              -- 'open' | 'close'
    won             BOOLEAN NOT NULL DEFAULT FALSE,
    lost            BOOLEAN NOT NULL DEFAULT FALSE,
    PRIMARY KEY (pipeline_id, name)
);

-- ===========================================
-- DIRECTORY (label lookups, company join)
-- ===========================================
CREATE TABLE IF NOT EXISTS sources (
    id              VARCHAR PRIMARY KEY,
    organization_id VARCHAR NOT NULL,
    name            VARCHAR NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sources_org ON sources(organization_id);

CREATE TABLE IF NOT EXISTS companies (
    id              VARCHAR PRIMARY KEY,
    organization_id VARCHAR NOT NULL,
    name            VARCHAR NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_companies_org ON companies(organization_id);

CREATE TABLE IF NOT EXISTS contacts (
    id              VARCHAR PRIMARY KEY,
    organization_id VARCHAR NOT NULL,
    name            VARCHAR NOT NULL,
    company_id      VARCHAR                        -- NULL when not linked to a company
);
CREATE INDEX IF NOT EXISTS idx_contacts_org ON contacts(organization_id);

-- ===========================================
-- LEADS
-- ===========================================
CREATE TABLE IF NOT EXISTS leads (
    id              VARCHAR PRIMARY KEY,
    organization_id VARCHAR NOT NULL,
    title           VARCHAR NOT NULL,
    amount          DOUBLE NOT NULL DEFAULT 0 CHECK (amount >= 0),
    stage           VARCHAR NOT NULL,
    pipeline_id     VARCHAR NOT NULL,
    source_id       VARCHAR,
    contact_id      VARCHAR,
    created_at      TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_leads_org_time ON leads(organization_id, created_at);

-- ===========================================
-- FOLLOW-UPS
-- ===========================================
CREATE TABLE IF NOT EXISTS followups (
    id              VARCHAR PRIMARY KEY,
    organization_id VARCHAR NOT NULL,
    stage           VARCHAR NOT NULL,              -- 'Open' | 'Closed'
    followup_type   VARCHAR NOT NULL,              -- 'Call' | 'Email' | 'WhatsApp' | ...
    followup_date   TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_followups_org_time ON followups(organization_id, followup_date);
"#
    )
}
