use anyhow::Result;
use notion::{Client, DatabaseSource};
use tabular::{
    AggregateFunction, AggregationSpec, ConditionSet, Operator, PageLimits, QueryRequest, Value,
};

use mock_server::{DATABASE_ID, MockNotionServer};

fn option_names(options: Vec<tabular::SelectOption>) -> Vec<String> {
    options.into_iter().map(|o| o.name).collect()
}

/// All pages are requested in cursor order and flattened into one table
#[test]
fn test_fetch_table_pages_through_database() -> Result<()> {
    diagnostics::init_diagnostics();
    let server = MockNotionServer::start()?;
    let mut config = server.config();
    config.page_size = 2;

    let table = notion::fetch_table(&config, "expenses")?;

    assert_eq!(
        server.cursors(),
        vec![None, Some("2".to_string()), Some("4".to_string())]
    );
    assert_eq!(
        table.columns(),
        &["Name", "Precio", "Categoria", "Evento", "Fecha", "Pagado"]
    );
    assert_eq!(table.len(), 5);
    assert_eq!(table.value(0, "Name"), Some(&Value::from("Cena")));
    assert_eq!(table.value(0, "Fecha"), Some(&Value::Date("2023-02-01".into())));
    assert_eq!(
        table.value(2, "Evento"),
        Some(&Value::List(vec!["Boda".into(), "Cumple".into()]))
    );
    assert_eq!(table.value(1, "Pagado"), Some(&Value::from(false)));
    Ok(())
}

#[test]
fn test_query_fetched_table() -> Result<()> {
    let server = MockNotionServer::start()?;
    let table = notion::fetch_table(&server.config(), "expenses")?;

    let request = QueryRequest::new()
        .with_conditions(ConditionSet::new().with("Fecha", Operator::Gte, "2023-01-01"))
        .with_aggregation(AggregationSpec::new(
            ["Categoria"],
            "Precio",
            AggregateFunction::Sum,
        ));
    let result = request.execute(&table)?;

    assert_eq!(result.columns(), &["Categoria", "Precio_sum"]);
    assert_eq!(
        result.rows(),
        &[
            vec![Value::from("Comida"), Value::from(100.5)],
            vec![Value::from("Casa"), Value::from(900)],
        ]
    );
    Ok(())
}

#[test]
fn test_database_source_directly() -> Result<()> {
    let server = MockNotionServer::start()?;
    let mut config = server.config();
    config.page_size = 3;
    let client = Client::new(&config)?;

    let source = DatabaseSource::new(&client, DATABASE_ID);
    assert_eq!(source.database_id(), DATABASE_ID);

    let records = tabular::drain(source, PageLimits::default())?;
    assert_eq!(records.len(), 5);
    assert_eq!(server.cursors().len(), 2);
    Ok(())
}

#[test]
fn test_page_ceiling_is_an_error() -> Result<()> {
    let server = MockNotionServer::start()?;
    let mut config = server.config();
    config.page_size = 1;
    config.max_pages = 2;

    let err = notion::fetch_table(&config, "expenses").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<tabular::Error>(),
        Some(tabular::Error::SourceExhausted { pages: 2 })
    ));
    Ok(())
}

#[test]
fn test_property_options() -> Result<()> {
    diagnostics::init_diagnostics();
    let server = MockNotionServer::start()?;
    let config = server.config();

    let categories = notion::property_options(&config, "expenses", "Categoria")?;
    assert_eq!(
        option_names(categories.unwrap()),
        vec!["Comida", "Casa", "Otros", "Transporte"]
    );

    let events = notion::property_options(&config, "expenses", "Evento")?;
    assert_eq!(option_names(events.unwrap()), vec!["Boda", "Cumple"]);

    assert_eq!(notion::property_options(&config, "expenses", "Precio")?, None);
    assert_eq!(notion::property_options(&config, "expenses", "Nope")?, None);
    Ok(())
}

#[test]
fn test_bad_token_reports_status_and_message() -> Result<()> {
    diagnostics::init_diagnostics();
    let server = MockNotionServer::start()?;
    let mut config = server.config();
    config.token = Some("secret_wrong".into());

    let err = notion::fetch_table(&config, "expenses").unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("401"), "{message}");
    assert!(message.contains("API token is invalid"), "{message}");
    Ok(())
}

#[test]
fn test_unknown_database_and_alias() -> Result<()> {
    let server = MockNotionServer::start()?;
    let config = server.config();

    let err = notion::property_options(&config, "missing", "Categoria").unwrap_err();
    assert!(format!("{err:#}").contains("404"));

    let err = notion::fetch_table(&config, "income").unwrap_err();
    assert!(err.to_string().contains("Unknown database alias"));
    Ok(())
}
