use msapi::{AuthConfig, Config, DatabaseConfig, LoggingConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct LoginClaims {
    sub: String,
    session: i64,
}

#[test]
fn config_wires_database_and_tokens() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir.path().join("sessions.db");

    let config = Config {
        database: DatabaseConfig {
            descriptor: db_path.to_string_lossy().into_owned(),
            max_idle_connections: 2,
            ..DatabaseConfig::default()
        },
        auth: AuthConfig {
            secret: "integration-secret".to_string(),
        },
        logging: LoggingConfig {
            level: "msapi_db=debug,info".to_string(),
            json: false,
        },
    };
    msapi::init_tracing(&config.logging);
    msapi::init_tracing(&config.logging);

    let mut db = msapi::executor(&config.database);
    assert!(!db.is_connected());

    db.exec("CREATE TABLE sessions (id INTEGER PRIMARY KEY, user TEXT NOT NULL)")
        .expect("create table");
    let inserted = db
        .exec("INSERT INTO sessions (user) VALUES ('user-42')")
        .expect("insert session");
    db.save_change().expect("commit");

    let session = inserted.last_insert_id.expect("insert id");
    let tokens = msapi::token_service(&config.auth);
    let token = tokens
        .issue(&LoginClaims {
            sub: "user-42".to_string(),
            session,
        })
        .expect("issue token");

    let claims: LoginClaims = tokens.decode_claims(&token).expect("decode token");
    let row = db
        .query_single(&format!(
            "SELECT user FROM sessions WHERE id = {}",
            claims.session
        ))
        .expect("lookup session")
        .expect("session row");
    assert_eq!(row.get::<String>(0).expect("user"), claims.sub);

    db.close();
    assert!(!db.is_connected());
}
