use dbnav_adapters::mysql::MysqlBackend;
use dbnav_core::connection_manager::{ConnectionManager, Credentials, DatabaseBackend};
use dbnav_core::layout::Area;
use dbnav_core::navigator::{NavigatorSettings, ScreenNavigator};
use dbnav_core::session::{LoginField, Screen};

const DATABASE: &str = "dbnav_adapters_it";

fn mysql_integration_enabled() -> bool {
    matches!(
        std::env::var("DBNAV_RUN_MYSQL_INTEGRATION").ok().as_deref(),
        Some("1")
    )
}

fn integration_credentials() -> Credentials {
    Credentials {
        host: std::env::var("DBNAV_TEST_DB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        port: std::env::var("DBNAV_TEST_DB_PORT")
            .ok()
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(3306),
        user: std::env::var("DBNAV_TEST_DB_USER").unwrap_or_else(|_| "root".to_string()),
        password: std::env::var("DBNAV_TEST_DB_PASSWORD").unwrap_or_default(),
    }
}

async fn seed(credentials: &Credentials) {
    let mut manager = ConnectionManager::new(MysqlBackend);
    manager
        .connect(credentials.clone())
        .await
        .expect("seed connect should succeed");
    for sql in [
        format!("CREATE DATABASE IF NOT EXISTS `{DATABASE}`"),
        format!("DROP TABLE IF EXISTS `{DATABASE}`.`people`"),
        format!(
            "CREATE TABLE `{DATABASE}`.`people` (\
             id BIGINT NOT NULL PRIMARY KEY,\
             email VARCHAR(64) NOT NULL,\
             age INT NULL)"
        ),
        format!(
            "INSERT INTO `{DATABASE}`.`people` (id, email, age) VALUES \
             (1, 'a@example.com', 22), (2, 'b@example.com', NULL)"
        ),
    ] {
        manager.query(&sql).await.expect("seed statement should run");
    }
    manager
        .disconnect()
        .await
        .expect("seed disconnect should succeed");
}

#[tokio::test(flavor = "current_thread")]
async fn mysql_backend_ping_and_query_paths() {
    if !mysql_integration_enabled() {
        return;
    }
    let credentials = integration_credentials();
    seed(&credentials).await;

    let backend = MysqlBackend;
    let mut connection = backend
        .connect(&credentials)
        .await
        .expect("connect should succeed");
    backend
        .ping(&mut connection)
        .await
        .expect("ping should succeed");

    let rows = backend
        .query(
            &mut connection,
            &format!("SELECT id, email, age FROM `{DATABASE}`.`people` ORDER BY id"),
        )
        .await
        .expect("select should succeed");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].first(), Some("1"));
    assert_eq!(rows[1].cells[2], None);

    backend
        .disconnect(connection)
        .await
        .expect("disconnect should succeed");
}

#[tokio::test(flavor = "current_thread")]
async fn navigator_walks_login_to_table_data() {
    if !mysql_integration_enabled() {
        return;
    }
    let credentials = integration_credentials();
    seed(&credentials).await;

    let settings = NavigatorSettings {
        host: credentials.host.clone(),
        ..NavigatorSettings::default()
    };
    let mut navigator = ScreenNavigator::new(MysqlBackend, settings);
    navigator.set_viewport(Area::new(0, 0, 120, 40));
    for (field, value) in [
        (LoginField::Username, credentials.user.clone()),
        (LoginField::Password, credentials.password.clone()),
        (LoginField::Port, credentials.port.to_string()),
    ] {
        let area = navigator.layout().field(field);
        navigator.focus_at(dbnav_core::layout::Point::new(area.x + 1, area.y + 1));
        for ch in value.chars() {
            navigator.type_char(ch);
        }
    }

    navigator.connect().await.expect("login should succeed");
    assert_eq!(navigator.state().screen, Screen::DatabaseList);
    let db_index = navigator
        .state()
        .databases
        .iter()
        .position(|name| name == DATABASE)
        .expect("seeded database should be listed");

    navigator
        .select_database(db_index)
        .await
        .expect("tables should be listed");
    assert_eq!(navigator.state().tables.as_slice(), &["people"]);

    navigator.select_table(0).await.expect("rows should load");
    assert_eq!(navigator.state().screen, Screen::TableData);
    assert_eq!(
        navigator.state().table_data.as_str(),
        "1 a@example.com 22\n2 b@example.com NULL\n"
    );

    navigator.shutdown().await;
    assert!(!navigator.connection_status().is_connected);
}
