use activity_kpi_core::{
    default_aggregator, records_from_json, AggregateOptions, Aggregator, EngineConfig,
};
use chrono::NaiveDate;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const PAYLOAD: &str = r#"[
    {"id": 1, "label": "Famílias Embarcadas Decolagem", "quantity": 500, "activity_date": "2026-10-18T09:00:00"},
    {"id": 2, "label": "Famílias Embarcadas Decolagem", "quantity": "300", "activity_date": "2026-10-18T00:00:00"},
    {"id": 3, "titulo": "familias embarcadas - decolagem", "qtd": "450", "data_inicio": "2026-10-17T23:59:59"},
    {"id": "legacy-4", "tipo": "familias_embarcadas_decolagem", "quantidade": 200},
    {"id": 5, "label": "Famílias Embarcadas Decolagem", "quantity": "n/d", "created_at": "18/10/2026"},
    {"id": 6, "label": "Diagnósticos Realizados", "quantity": 100, "status": "aprovado"},
    {"id": 7, "label": "ONGs Decolagem", "quantity": 50},
    {"id": 8, "label": "Reunião de liga", "categoria": "Ligas Maras", "quantity": null, "qtd": 4},
    {"id": 9, "label": null, "title": "", "quantity": 999}
]"#;

const FAMILIAS: [&str; 2] = ["Famílias Embarcadas Decolagem", "familias_embarcadas_decolagem"];

#[test]
fn sums_mixed_field_names() {
    init_tracing();
    let records = records_from_json(PAYLOAD).unwrap();
    assert_eq!(records.len(), 9);

    let total =
        default_aggregator().sum_by_labels(&records, &FAMILIAS, AggregateOptions::default());
    // 500 + 300 + 450 + 200 + 1 (unreadable quantity)
    assert_eq!(total, 1451.0);
}

#[test]
fn today_only_pins_reference_day() {
    init_tracing();
    let records = records_from_json(PAYLOAD).unwrap();
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

    let total = default_aggregator().sum_by_labels(
        &records,
        &FAMILIAS,
        AggregateOptions::today_only().as_of(today),
    );
    // ids 1, 2 and 5; id 3 is a second too early, id 4 has no date
    assert_eq!(total, 801.0);
}

#[test]
fn dashboard_cards_from_bundled_config() {
    init_tracing();
    let records = records_from_json(PAYLOAD).unwrap();
    let config = EngineConfig::bundled();
    let totals = Aggregator::from_config(config).aggregate_kpis(
        &records,
        config.kpis(),
        AggregateOptions::default(),
    );

    let total_of = |key: &str| totals.iter().find(|t| t.key == key).map(|t| t.total);
    assert_eq!(total_of("familias_embarcadas_decolagem"), Some(1451.0));
    assert_eq!(total_of("diagnosticos_realizados"), Some(100.0));
    assert_eq!(total_of("ongs_decolagem"), Some(50.0));
    assert_eq!(total_of("ligas_maras"), Some(4.0));
    assert_eq!(total_of("nps_nacional"), Some(0.0));
}

#[test]
fn custom_vocabulary_changes_classification() {
    init_tracing();
    let config = EngineConfig::from_toml_str(
        r#"
        version = "test"
        program_tokens = ["decolagem"]

        [synonyms]
        fam = "familia"
        familias = "familia"

        [[kpis]]
        key = "familias"
        labels = ["Famílias Decolagem"]
        "#,
    )
    .unwrap();
    let records = records_from_json(
        r#"[{"label": "Fam. Decolagem", "quantity": 3}, {"label": "Fam Decolagem"}]"#,
    )
    .unwrap();

    let aggregator = Aggregator::from_config(&config);
    assert_eq!(
        aggregator.sum_by_labels(&records, &["Famílias Decolagem"], AggregateOptions::default()),
        4.0
    );
    // the bundled vocabulary has no "fam" abbreviation
    assert_eq!(
        default_aggregator().sum_by_labels(
            &records,
            &["Famílias Decolagem"],
            AggregateOptions::default()
        ),
        0.0
    );
}
