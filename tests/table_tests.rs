mod support;

use dmadmin::charset::normalizer::CharsetSettings;
use dmadmin::exec::catalog::{
    current_schema, list_schemas, list_tables, schema_listing, table_columns,
};
use dmadmin::exec::connection::Cursor;
use dmadmin::exec::executor::exec;
use dmadmin::exec::table::{
    browse_table, table_rows, table_total_rows, update_cell, CellUpdate, CellValue,
};
use dmadmin::sql::pager::PageRequest;
use dmadmin::value::{Row, Value};
use dmadmin::Error;
use support::{count_cursor, name_cursor, numbered_rows, sqlite_users, ScriptedConnection};

fn column_cursor() -> Cursor {
    let columns = ["COLUMN_NAME", "DATA_TYPE", "DATA_LENGTH", "NULLABLE"];
    let row = |name: &str, ty: &str, len: &str, nullable: &str| {
        Row::new()
            .with(columns[0], Value::text(name))
            .with(columns[1], Value::text(ty))
            .with(columns[2], Value::text(len))
            .with(columns[3], Value::text(nullable))
    };
    Cursor::new(
        columns.iter().map(|c| c.to_string()).collect(),
        vec![row("ID", "INT", "4", "N"), row("NAME", "VARCHAR", "50", "Y")],
    )
}

fn cell_update(value: CellValue) -> CellUpdate {
    CellUpdate {
        schema: "main".to_string(),
        table: "users".to_string(),
        column: "name".to_string(),
        key_column: "id".to_string(),
        key_value: "2".to_string(),
        value,
    }
}

#[test]
fn browse_uses_dictionary_metadata_when_available() {
    let mut conn = ScriptedConnection::new()
        .respond("COUNT(*)", count_cursor(3))
        .respond("FETCH FIRST", numbered_rows(3))
        .respond("ALL_TAB_COLUMNS", column_cursor())
        .respond("ALL_CONSTRAINTS", name_cursor("COLUMN_NAME", &["ID"]));

    let page = browse_table(
        &mut conn,
        "app",
        "users",
        PageRequest::new(1, 50),
        &CharsetSettings::default(),
    )
    .expect("browse should succeed");

    assert_eq!(page.columns, vec!["ID", "NAME"]);
    assert_eq!(page.primary_key.as_deref(), Some("ID"));
    assert_eq!(page.column_info[1].length, Some(50));
    assert!(page.column_info[1].nullable);
    assert_eq!(page.result.row_count, 3);
    assert_eq!(page.pagination.total_rows, 3);

    let statements = conn.statements();
    assert_eq!(statements[0], "SELECT COUNT(*) FROM \"APP\".\"USERS\"");
    assert_eq!(
        statements[1],
        "SELECT * FROM \"APP\".\"USERS\" FETCH FIRST 50 ROWS ONLY"
    );
    let column_lookup = conn
        .executed
        .iter()
        .find(|e| e.sql.contains("ALL_TAB_COLUMNS"))
        .expect("column lookup should run");
    assert_eq!(
        column_lookup.params,
        vec![Value::text("APP"), Value::text("USERS")]
    );
}

#[test]
fn browse_on_sqlite_falls_back_everywhere() {
    let mut conn = sqlite_users(5);

    let page = browse_table(
        &mut conn,
        "main",
        "users",
        PageRequest::new(2, 2),
        &CharsetSettings::default(),
    )
    .expect("browse should fall back to LIMIT/OFFSET");

    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.offset, 2);
    assert_eq!(page.columns, vec!["id", "name", "note"]);
    assert!(page.column_info.is_empty());
    assert!(page.primary_key.is_none());
    assert_eq!(page.result.rows[0].get("name"), Some(&Value::text("user3")));
}

#[test]
fn browse_without_count_reports_fetched_rows_as_one_page() {
    let mut conn = ScriptedConnection::new()
        .reject("COUNT", "count denied")
        .respond("SELECT * FROM", numbered_rows(3));

    let page = browse_table(
        &mut conn,
        "app",
        "t",
        PageRequest::new(4, 50),
        &CharsetSettings::default(),
    )
    .expect("rows should still be read");

    assert_eq!(page.result.row_count, 3);
    assert_eq!(page.pagination.total_rows, 3);
    assert_eq!(page.pagination.total_pages, 1);
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.offset, 0);
}

#[test]
fn browse_of_empty_table_keeps_requested_page_size() {
    let mut conn = ScriptedConnection::new().respond("COUNT(*)", count_cursor(0));
    let page = browse_table(
        &mut conn,
        "app",
        "t",
        PageRequest::new(1, 20),
        &CharsetSettings::default(),
    )
    .expect("empty table should browse");

    assert_eq!(page.result.row_count, 0);
    assert_eq!(page.pagination.total_rows, 0);
    assert_eq!(page.pagination.page_size, 20);
}

#[test]
fn table_rows_use_full_window_past_first_page() {
    let mut conn = ScriptedConnection::new().reject("FETCH", "unsupported");
    let result = table_rows(
        &mut conn,
        "APP",
        "T",
        20,
        40,
        &CharsetSettings::default(),
    )
    .expect("LIMIT fallback should succeed");

    assert_eq!(result.row_count, 0);
    assert_eq!(
        conn.statements(),
        vec![
            "SELECT * FROM \"APP\".\"T\" OFFSET 40 ROWS FETCH NEXT 20 ROWS ONLY",
            "SELECT * FROM \"APP\".\"T\" LIMIT 20 OFFSET 40",
        ]
    );
}

#[test]
fn failed_table_count_is_zero() {
    let mut conn = ScriptedConnection::new().reject("COUNT", "no such table");
    assert_eq!(
        table_total_rows(&mut conn, "APP", "T", &CharsetSettings::default()),
        0
    );
}

#[test]
fn update_cell_writes_text_null_and_empty() {
    let mut conn = sqlite_users(3);
    let charsets = CharsetSettings::default();

    let affected = update_cell(&mut conn, &cell_update(CellValue::Text("bob".into())), &charsets)
        .expect("update should succeed");
    assert_eq!(affected, 1);
    let check = exec(&mut conn, b"SELECT name FROM users WHERE id = 2", &charsets).unwrap();
    assert_eq!(check.rows[0].get("name"), Some(&Value::text("bob")));

    update_cell(&mut conn, &cell_update(CellValue::Empty), &charsets).unwrap();
    let check = exec(&mut conn, b"SELECT name FROM users WHERE id = 2", &charsets).unwrap();
    assert_eq!(check.rows[0].get("name"), Some(&Value::text("")));

    update_cell(&mut conn, &cell_update(CellValue::Null), &charsets).unwrap();
    let check = exec(&mut conn, b"SELECT name FROM users WHERE id = 2", &charsets).unwrap();
    assert_eq!(check.rows[0].get("name"), Some(&Value::Null));
}

#[test]
fn update_cell_quotes_identifiers_and_binds_values() {
    let mut conn = ScriptedConnection::new().affect(1);
    let update = CellUpdate {
        schema: "app".into(),
        table: "\"Mixed\"".into(),
        column: "note".into(),
        key_column: "id".into(),
        key_value: "7".into(),
        value: CellValue::Null,
    };
    update_cell(&mut conn, &update, &CharsetSettings::default()).unwrap();

    assert_eq!(
        conn.statements(),
        vec!["UPDATE \"APP\".\"Mixed\" SET \"NOTE\" = NULL WHERE \"ID\" = ?"]
    );
    assert_eq!(conn.executed[0].params, vec![Value::text("7")]);
}

#[test]
fn update_cell_reencodes_values_for_the_connection() {
    let mut conn = ScriptedConnection::new().affect(1);
    let mut update = cell_update(CellValue::Text("你好".into()));
    update.key_value = "数据".into();
    update_cell(&mut conn, &update, &CharsetSettings::new("GBK", "UTF-8", "")).unwrap();

    assert_eq!(
        conn.executed[0].params,
        vec![
            Value::Text(vec![0xC4, 0xE3, 0xBA, 0xC3]),
            Value::Text(vec![0xCA, 0xFD, 0xBE, 0xDD]),
        ]
    );
}

#[test]
fn update_cell_rejects_incomplete_requests() {
    let mut conn = ScriptedConnection::new();
    let charsets = CharsetSettings::default();

    let mut missing_column = cell_update(CellValue::Empty);
    missing_column.column = "  ".into();
    assert!(matches!(
        update_cell(&mut conn, &missing_column, &charsets),
        Err(Error::MissingParameter("column"))
    ));

    let mut no_key = cell_update(CellValue::Empty);
    no_key.key_column.clear();
    match update_cell(&mut conn, &no_key, &charsets) {
        Err(Error::NoPrimaryKey { schema, table }) => {
            assert_eq!((schema.as_str(), table.as_str()), ("main", "users"));
        }
        other => panic!("expected NoPrimaryKey, got {other:?}"),
    }
    assert!(conn.executed.is_empty());
}

#[test]
fn schema_list_falls_back_to_current_user() {
    let mut conn = ScriptedConnection::new()
        .reject("ALL_OBJECTS", "insufficient privileges")
        .respond("FROM DUAL", name_cursor("USER", &["sysdba"]));
    assert_eq!(
        list_schemas(&mut conn, &CharsetSettings::default()),
        vec!["SYSDBA"]
    );
}

#[test]
fn table_list_falls_back_to_user_tables_then_empty() {
    let charsets = CharsetSettings::default();

    let mut conn = ScriptedConnection::new()
        .reject("ALL_TABLES", "insufficient privileges")
        .respond("USER_TABLES", name_cursor("TABLE_NAME", &["A", "B"]));
    assert_eq!(list_tables(&mut conn, "app", &charsets), vec!["A", "B"]);
    assert_eq!(conn.executed[0].params, vec![Value::text("APP")]);

    let mut sqlite = sqlite_users(1);
    assert!(list_tables(&mut sqlite, "main", &charsets).is_empty());
}

#[test]
fn catalog_lookups_degrade_on_non_dm_databases() {
    let mut conn = sqlite_users(1);
    let charsets = CharsetSettings::default();
    assert_eq!(current_schema(&mut conn, &charsets), "");
    assert!(list_schemas(&mut conn, &charsets).is_empty());
    assert!(table_columns(&mut conn, "main", "users", &charsets).is_empty());
}

#[test]
fn schema_listing_falls_back_to_first_listed_schema() {
    let mut conn = ScriptedConnection::new()
        .respond("ALL_OBJECTS", name_cursor("OWNER", &["SYSDBA", "APP"]));
    let listing = schema_listing(&mut conn, "", "reports", &CharsetSettings::default());
    assert_eq!(listing.active, "reports");
    assert_eq!(listing.schemas, vec!["SYSDBA", "APP", "reports"]);

    let mut conn = ScriptedConnection::new()
        .respond("ALL_OBJECTS", name_cursor("OWNER", &["SYSDBA", "APP"]));
    let listing = schema_listing(&mut conn, " ", "", &CharsetSettings::default());
    assert_eq!(listing.active, "SYSDBA");
    assert_eq!(listing.schemas, vec!["SYSDBA", "APP"]);
}

#[test]
fn schema_listing_prefers_requested_over_current_schema() {
    let mut conn = ScriptedConnection::new()
        .respond("FROM DUAL", name_cursor("USER", &["sysdba"]))
        .respond("ALL_OBJECTS", name_cursor("OWNER", &["SYSDBA"]));
    let charsets = CharsetSettings::default();

    let listing = schema_listing(&mut conn, "app", "", &charsets);
    assert_eq!(listing.active, "app");
    assert_eq!(listing.schemas, vec!["SYSDBA", "app"]);

    let listing = schema_listing(&mut conn, "", "", &charsets);
    assert_eq!(listing.active, "SYSDBA");
    assert_eq!(listing.schemas, vec!["SYSDBA"]);
}
