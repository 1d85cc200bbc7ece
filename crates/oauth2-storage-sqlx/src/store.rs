use async_trait::async_trait;
use oauth2_core::{ApiResource, IdentityResource, OAuth2Error};
use oauth2_ports::ResourceStore;
use sqlx::{Pool, Postgres, QueryBuilder, Sqlite};
use std::borrow::Cow;
use std::path::PathBuf;

use crate::rows::{
    self, ApiResourceRow, ApiScopeRow, IdentityResourceRow, API_RESOURCE_COLUMNS,
    API_SCOPE_COLUMNS, IDENTITY_COLUMNS,
};

#[derive(Clone, Debug)]
enum DatabasePool {
    Sqlite(Pool<Sqlite>),
    Postgres(Pool<Postgres>),
}

/// SQL-backed resource catalog (SQLite/Postgres) using SQLx.
pub struct SqlxResourceStore {
    pool: DatabasePool,
}

// The schema only uses types both backends accept, so one bootstrap serves both.
const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS identity_resources (
        name TEXT PRIMARY KEY,
        display_name TEXT,
        description TEXT,
        required BOOLEAN NOT NULL DEFAULT FALSE,
        emphasize BOOLEAN NOT NULL DEFAULT FALSE,
        enabled BOOLEAN NOT NULL DEFAULT TRUE,
        show_in_discovery_document BOOLEAN NOT NULL DEFAULT TRUE,
        user_claims TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS api_resources (
        name TEXT PRIMARY KEY,
        display_name TEXT,
        description TEXT,
        enabled BOOLEAN NOT NULL DEFAULT TRUE,
        user_claims TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS api_scopes (
        api_resource_name TEXT NOT NULL,
        position BIGINT NOT NULL,
        name TEXT NOT NULL,
        display_name TEXT,
        description TEXT,
        required BOOLEAN NOT NULL DEFAULT FALSE,
        emphasize BOOLEAN NOT NULL DEFAULT FALSE,
        show_in_discovery_document BOOLEAN NOT NULL DEFAULT TRUE,
        user_claims TEXT NOT NULL,
        PRIMARY KEY (api_resource_name, position),
        UNIQUE (api_resource_name, name),
        FOREIGN KEY (api_resource_name) REFERENCES api_resources(name) ON DELETE CASCADE
    );
    "#,
    r#"CREATE INDEX IF NOT EXISTS idx_api_scopes_name ON api_scopes(name);"#,
];

const INSERT_IDENTITY_RESOURCE_SQLITE: &str = r#"
    INSERT INTO identity_resources (name, display_name, description, required, emphasize, enabled, show_in_discovery_document, user_claims)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;
const INSERT_IDENTITY_RESOURCE_POSTGRES: &str = r#"
    INSERT INTO identity_resources (name, display_name, description, required, emphasize, enabled, show_in_discovery_document, user_claims)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;
const INSERT_API_RESOURCE_SQLITE: &str = r#"
    INSERT INTO api_resources (name, display_name, description, enabled, user_claims)
    VALUES (?, ?, ?, ?, ?)
"#;
const INSERT_API_RESOURCE_POSTGRES: &str = r#"
    INSERT INTO api_resources (name, display_name, description, enabled, user_claims)
    VALUES ($1, $2, $3, $4, $5)
"#;
const INSERT_API_SCOPE_SQLITE: &str = r#"
    INSERT INTO api_scopes (api_resource_name, position, name, display_name, description, required, emphasize, show_in_discovery_document, user_claims)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;
const INSERT_API_SCOPE_POSTGRES: &str = r#"
    INSERT INTO api_scopes (api_resource_name, position, name, display_name, description, required, emphasize, show_in_discovery_document, user_claims)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

impl SqlxResourceStore {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = if database_url.starts_with("postgres") {
            DatabasePool::Postgres(Pool::<Postgres>::connect(database_url).await?)
        } else {
            // Best-effort: if we can't create it (permissions, etc.), sqlx will surface the
            // underlying error on connect.
            if let Some(path) = sqlite_db_path(database_url) {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        let _ = std::fs::create_dir_all(parent);
                    }
                }

                if !path.as_os_str().is_empty() && !path.exists() {
                    let _ = std::fs::File::create(&path);
                }
            }

            let connect_url = sqlite_url_with_create_mode(database_url);
            DatabasePool::Sqlite(Pool::<Sqlite>::connect(connect_url.as_ref()).await?)
        };

        Ok(Self { pool })
    }

    async fn bootstrap_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            match &self.pool {
                DatabasePool::Sqlite(pool) => {
                    sqlx::query(statement).execute(pool).await?;
                }
                DatabasePool::Postgres(pool) => {
                    sqlx::query(statement).execute(pool).await?;
                }
            }
        }

        Ok(())
    }

    async fn fetch_identity_resources(
        &self,
        names: Option<&[String]>,
    ) -> Result<Vec<IdentityResource>, OAuth2Error> {
        let rows = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let mut qb = QueryBuilder::<Sqlite>::new(format!(
                    "SELECT {IDENTITY_COLUMNS} FROM identity_resources"
                ));
                if let Some(names) = names {
                    qb.push(" WHERE name IN ");
                    push_name_list(&mut qb, names);
                }
                qb.push(" ORDER BY name");
                qb.build_query_as::<IdentityResourceRow>()
                    .fetch_all(pool)
                    .await?
            }
            DatabasePool::Postgres(pool) => {
                let mut qb = QueryBuilder::<Postgres>::new(format!(
                    "SELECT {IDENTITY_COLUMNS} FROM identity_resources"
                ));
                if let Some(names) = names {
                    qb.push(" WHERE name IN ");
                    push_name_list(&mut qb, names);
                }
                qb.push(" ORDER BY name");
                qb.build_query_as::<IdentityResourceRow>()
                    .fetch_all(pool)
                    .await?
            }
        };

        rows::identity_resources(rows)
    }

    /// API resources owning a scope in `names` (all of them for `None`),
    /// loaded with their full scope lists.
    async fn fetch_api_resources(
        &self,
        names: Option<&[String]>,
    ) -> Result<Vec<ApiResource>, OAuth2Error> {
        let (resources, scopes) = match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let mut qb = QueryBuilder::<Sqlite>::new(format!(
                    "SELECT {API_RESOURCE_COLUMNS} FROM api_resources"
                ));
                if let Some(names) = names {
                    qb.push(" WHERE name IN (SELECT api_resource_name FROM api_scopes WHERE name IN ");
                    push_name_list(&mut qb, names);
                    qb.push(")");
                }
                qb.push(" ORDER BY name");
                let resources = qb.build_query_as::<ApiResourceRow>().fetch_all(pool).await?;

                let mut qb = QueryBuilder::<Sqlite>::new(format!(
                    "SELECT {API_SCOPE_COLUMNS} FROM api_scopes"
                ));
                if let Some(names) = names {
                    qb.push(" WHERE api_resource_name IN (SELECT api_resource_name FROM api_scopes WHERE name IN ");
                    push_name_list(&mut qb, names);
                    qb.push(")");
                }
                qb.push(" ORDER BY api_resource_name, position");
                let scopes = qb.build_query_as::<ApiScopeRow>().fetch_all(pool).await?;

                (resources, scopes)
            }
            DatabasePool::Postgres(pool) => {
                let mut qb = QueryBuilder::<Postgres>::new(format!(
                    "SELECT {API_RESOURCE_COLUMNS} FROM api_resources"
                ));
                if let Some(names) = names {
                    qb.push(" WHERE name IN (SELECT api_resource_name FROM api_scopes WHERE name IN ");
                    push_name_list(&mut qb, names);
                    qb.push(")");
                }
                qb.push(" ORDER BY name");
                let resources = qb.build_query_as::<ApiResourceRow>().fetch_all(pool).await?;

                let mut qb = QueryBuilder::<Postgres>::new(format!(
                    "SELECT {API_SCOPE_COLUMNS} FROM api_scopes"
                ));
                if let Some(names) = names {
                    qb.push(" WHERE api_resource_name IN (SELECT api_resource_name FROM api_scopes WHERE name IN ");
                    push_name_list(&mut qb, names);
                    qb.push(")");
                }
                qb.push(" ORDER BY api_resource_name, position");
                let scopes = qb.build_query_as::<ApiScopeRow>().fetch_all(pool).await?;

                (resources, scopes)
            }
        };

        rows::api_resources(resources, scopes)
    }
}

/// Append `(?, ?, ...)` with one bind per name.
fn push_name_list<'args, DB>(qb: &mut QueryBuilder<'args, DB>, names: &[String])
where
    DB: sqlx::Database,
    String: sqlx::Encode<'args, DB> + sqlx::Type<DB>,
{
    qb.push("(");
    let mut separated = qb.separated(", ");
    for name in names {
        separated.push_bind(name.clone());
    }
    separated.push_unseparated(")");
}

#[async_trait]
impl ResourceStore for SqlxResourceStore {
    async fn init(&self) -> Result<(), OAuth2Error> {
        self.bootstrap_schema().await.map_err(Into::into)
    }

    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        // Keep readiness/liveness cheap: don't run bootstrap or migrations.
        match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }

        Ok(())
    }

    async fn save_identity_resource(
        &self,
        resource: &IdentityResource,
    ) -> Result<(), OAuth2Error> {
        let user_claims = rows::claims_json(&resource.user_claims)?;

        match &self.pool {
            DatabasePool::Sqlite(pool) => {
                sqlx::query(INSERT_IDENTITY_RESOURCE_SQLITE)
                    .bind(&resource.name)
                    .bind(&resource.display_name)
                    .bind(&resource.description)
                    .bind(resource.required)
                    .bind(resource.emphasize)
                    .bind(resource.enabled)
                    .bind(resource.show_in_discovery_document)
                    .bind(&user_claims)
                    .execute(pool)
                    .await?;
            }
            DatabasePool::Postgres(pool) => {
                sqlx::query(INSERT_IDENTITY_RESOURCE_POSTGRES)
                    .bind(&resource.name)
                    .bind(&resource.display_name)
                    .bind(&resource.description)
                    .bind(resource.required)
                    .bind(resource.emphasize)
                    .bind(resource.enabled)
                    .bind(resource.show_in_discovery_document)
                    .bind(&user_claims)
                    .execute(pool)
                    .await?;
            }
        }

        Ok(())
    }

    async fn save_api_resource(&self, resource: &ApiResource) -> Result<(), OAuth2Error> {
        let user_claims = rows::claims_json(&resource.user_claims)?;
        let scope_claims = resource
            .scopes
            .iter()
            .map(|s| rows::claims_json(&s.user_claims))
            .collect::<Result<Vec<_>, _>>()?;

        match &self.pool {
            DatabasePool::Sqlite(pool) => {
                let mut tx = pool.begin().await?;
                sqlx::query(INSERT_API_RESOURCE_SQLITE)
                    .bind(&resource.name)
                    .bind(&resource.display_name)
                    .bind(&resource.description)
                    .bind(resource.enabled)
                    .bind(&user_claims)
                    .execute(&mut *tx)
                    .await?;
                for (position, (scope, claims)) in
                    resource.scopes.iter().zip(&scope_claims).enumerate()
                {
                    sqlx::query(INSERT_API_SCOPE_SQLITE)
                        .bind(&resource.name)
                        .bind(position as i64)
                        .bind(&scope.name)
                        .bind(&scope.display_name)
                        .bind(&scope.description)
                        .bind(scope.required)
                        .bind(scope.emphasize)
                        .bind(scope.show_in_discovery_document)
                        .bind(claims)
                        .execute(&mut *tx)
                        .await?;
                }
                tx.commit().await?;
            }
            DatabasePool::Postgres(pool) => {
                let mut tx = pool.begin().await?;
                sqlx::query(INSERT_API_RESOURCE_POSTGRES)
                    .bind(&resource.name)
                    .bind(&resource.display_name)
                    .bind(&resource.description)
                    .bind(resource.enabled)
                    .bind(&user_claims)
                    .execute(&mut *tx)
                    .await?;
                for (position, (scope, claims)) in
                    resource.scopes.iter().zip(&scope_claims).enumerate()
                {
                    sqlx::query(INSERT_API_SCOPE_POSTGRES)
                        .bind(&resource.name)
                        .bind(position as i64)
                        .bind(&scope.name)
                        .bind(&scope.display_name)
                        .bind(&scope.description)
                        .bind(scope.required)
                        .bind(scope.emphasize)
                        .bind(scope.show_in_discovery_document)
                        .bind(claims)
                        .execute(&mut *tx)
                        .await?;
                }
                tx.commit().await?;
            }
        }

        Ok(())
    }

    async fn find_identity_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<IdentityResource>, OAuth2Error> {
        if scope_names.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_identity_resources(Some(scope_names)).await
    }

    async fn find_api_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<ApiResource>, OAuth2Error> {
        if scope_names.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_api_resources(Some(scope_names)).await
    }

    async fn get_all_identity_resources(&self) -> Result<Vec<IdentityResource>, OAuth2Error> {
        self.fetch_identity_resources(None).await
    }

    async fn get_all_api_resources(&self) -> Result<Vec<ApiResource>, OAuth2Error> {
        self.fetch_api_resources(None).await
    }
}

fn sqlite_db_path(database_url: &str) -> Option<PathBuf> {
    if !database_url.starts_with("sqlite:") {
        return None;
    }
    if database_url.starts_with("sqlite::memory:") {
        return None;
    }

    let mut rest = &database_url["sqlite:".len()..];

    // Reduce URL-ish leading slashes to a single one.
    if rest.starts_with("///") {
        rest = &rest[2..];
    } else if rest.starts_with("//") {
        rest = &rest[1..];
    }

    let path_part = rest.split('?').next().unwrap_or(rest);
    if path_part.is_empty() {
        return None;
    }

    Some(PathBuf::from(path_part))
}

fn sqlite_url_with_create_mode(database_url: &str) -> Cow<'_, str> {
    if !database_url.starts_with("sqlite:") || database_url.starts_with("sqlite::memory:") {
        return Cow::Borrowed(database_url);
    }
    if database_url.contains("mode=") {
        return Cow::Borrowed(database_url);
    }

    let sep = if database_url.contains('?') { '&' } else { '?' };
    Cow::Owned(format!("{database_url}{sep}mode=rwc"))
}
