// Cleaning pipeline tests against the built-in EPW schema

mod common;

use common::*;
use weather_file_importer::cleaning::QualityRecord;
use weather_file_importer::log_sink::{LogLevel, MemorySink};
use weather_file_importer::pipeline::{ImportPipeline, ImportedTable, PipelineError};
use weather_file_importer::schema::{DeclaredType, SchemaRegistry};
use weather_file_importer::table::{Cell, RawTable, SiteMetadata};

fn run(rows: Vec<Vec<String>>) -> (ImportedTable, MemorySink) {
    let mut sink = MemorySink::new();
    let imported = ImportPipeline::new(SchemaRegistry::epw())
        .run(RawTable::new(rows), SiteMetadata::default(), &mut sink)
        .expect("pipeline should succeed");
    (imported, sink)
}

#[test]
fn test_valid_rows_have_no_quality_records() {
    let (imported, sink) = run(vec![epw_row(&[]), epw_row(&[])]);

    assert_eq!(imported.table.width(), 35);
    assert_eq!(imported.table.row_count, 2);
    assert!(imported.quality.is_empty());
    assert_eq!(imported.table.total_missing(), 0);
    assert!(!sink.entries.iter().any(|(level, _)| *level == LogLevel::Error));
}

#[test]
fn test_typed_columns() {
    let (imported, _) = run(vec![epw_row(&[])]);
    let table = &imported.table;

    assert_eq!(table.column("Year").unwrap().cells, vec![Cell::Int(1999)]);
    assert_eq!(
        table.column("Source").unwrap().cells,
        vec![Cell::Text(
            "?9?9?9?9E0?9?9?9?9?9?9?9?9?9?9?9?9*9*9?9?9".to_string()
        )]
    );
    assert_eq!(
        table.column("Dry Bulb Temperature").unwrap().cells,
        vec![Cell::Float(-3.0)]
    );
    assert_eq!(
        table.column("Atmospheric Station Pressure").unwrap().cells,
        vec![Cell::Int(82100)]
    );
    assert_eq!(
        table.column("Wind Speed").unwrap().cells,
        vec![Cell::Float(4.1)]
    );
    assert_eq!(
        table.column("Liquid Precipitation Quantity").unwrap().cells,
        vec![Cell::Int(0)]
    );
}

#[test]
fn test_wind_direction_scenario() {
    let rows = rows_with_column(WIND_DIRECTION, &["-5", "0", "180", "360", "400"]);
    let (imported, _) = run(rows);

    assert_eq!(
        imported.table.column("Wind Direction").unwrap().cells,
        vec![
            Cell::Absent,
            Cell::Int(0),
            Cell::Int(180),
            Cell::Int(360),
            Cell::Absent
        ]
    );
    assert_eq!(
        imported.quality,
        vec![QualityRecord {
            column_name: "Wind Direction".to_string(),
            missing_count: 2,
            total_count: 5,
        }]
    );
}

#[test]
fn test_temperature_scenario() {
    let rows = rows_with_column(DRY_BULB, &["20.5", "99.9", "-71", "15.0"]);
    let (imported, sink) = run(rows);

    assert_eq!(
        imported.table.column("Dry Bulb Temperature").unwrap().cells,
        vec![Cell::Float(20.5), Cell::Absent, Cell::Absent, Cell::Float(15.0)]
    );
    assert_eq!(imported.quality.len(), 1);
    assert_eq!(imported.quality[0].missing_count, 2);

    let stats = &imported.stats[DRY_BULB];
    assert_eq!(stats.sentinel_matches, 1);
    assert_eq!(stats.range_violations, 1);
    assert!(sink.contains(
        "Dry Bulb Temperature has 2 missing values out of 4 total values."
    ));
}

#[test]
fn test_no_sentinel_survives_scrubbing() {
    let registry = SchemaRegistry::epw();

    // One row where every column carries its own sentinel
    let overrides: Vec<(usize, String)> = registry
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.error_sentinel.map(|s| (i, s.to_string())))
        .collect();
    let override_refs: Vec<(usize, &str)> =
        overrides.iter().map(|(i, s)| (*i, s.as_str())).collect();

    let (imported, _) = run(vec![epw_row(&override_refs), epw_row(&[])]);

    for (column, schema) in imported.table.columns.iter().zip(registry.iter()) {
        let Some(sentinel) = schema.error_sentinel else {
            continue;
        };
        assert!(
            column.cells.iter().all(|c| c.as_f64() != Some(sentinel)),
            "{} still contains sentinel {}",
            schema.name,
            sentinel
        );
        assert!(column.cells[0].is_absent(), "{}", schema.name);
    }
}

#[test]
fn test_aerosol_fractional_sentinel() {
    let rows = rows_with_column(AEROSOL_OPTICAL_DEPTH, &["0.999", ".999", "0.0760"]);
    let (imported, _) = run(rows);

    assert_eq!(
        imported.table.column("Aerosol Optical Depth").unwrap().cells,
        vec![Cell::Absent, Cell::Absent, Cell::Float(0.076)]
    );
}

#[test]
fn test_boundary_values_are_kept() {
    let registry = SchemaRegistry::epw();

    let bound_row = |pick: fn(&weather_file_importer::schema::ColumnSchema) -> Option<f64>| {
        let overrides: Vec<(usize, String)> = registry
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                pick(c).map(|bound| {
                    let value = match c.effective_type() {
                        DeclaredType::Float => format!("{bound:.1}"),
                        _ => format!("{bound:.0}"),
                    };
                    (i, value)
                })
            })
            .collect();
        let refs: Vec<(usize, &str)> = overrides.iter().map(|(i, s)| (*i, s.as_str())).collect();
        epw_row(&refs)
    };

    let rows = vec![bound_row(|c| c.min_value), bound_row(|c| c.max_value)];
    let (imported, _) = run(rows);

    assert!(imported.quality.is_empty(), "{:?}", imported.quality);
    for (column, schema) in imported.table.columns.iter().zip(registry.iter()) {
        if let Some(min) = schema.min_value {
            assert_eq!(column.cells[0].as_f64(), Some(min), "{}", schema.name);
        }
        if let Some(max) = schema.max_value {
            assert_eq!(column.cells[1].as_f64(), Some(max), "{}", schema.name);
        }
    }
}

#[test]
fn test_present_cells_within_bounds() {
    let mut rows = rows_with_column(PRESSURE, &["30999", "31000", "120001", "101325"]);
    rows.extend(rows_with_column(RELATIVE_HUMIDITY, &["111", "-1"]));
    rows.extend(rows_with_column(WIND_SPEED, &["40.1", "40"]));
    let (imported, _) = run(rows);

    let registry = SchemaRegistry::epw();
    for (column, schema) in imported.table.columns.iter().zip(registry.iter()) {
        for value in column.cells.iter().filter_map(Cell::as_f64) {
            assert!(!schema.is_out_of_range(value), "{} = {}", schema.name, value);
        }
    }
    assert_eq!(
        imported
            .table
            .column("Atmospheric Station Pressure")
            .unwrap()
            .missing_count(),
        2
    );
}

#[test]
fn test_unparseable_cells_degrade_to_absent() {
    let rows = vec![
        epw_row(&[(0, "abc")]),
        epw_row(&[(RELATIVE_HUMIDITY, "")]),
        epw_row(&[(RELATIVE_HUMIDITY, "55.5")]),
    ];
    let (imported, sink) = run(rows);

    assert_eq!(imported.table.column("Year").unwrap().missing_count(), 1);
    assert_eq!(
        imported.table.column("Relative Humidity").unwrap().cells,
        vec![Cell::Int(73), Cell::Absent, Cell::Int(55)]
    );
    assert_eq!(imported.stats[0].coercion_failures, 1);
    assert_eq!(imported.stats[RELATIVE_HUMIDITY].coercion_failures, 1);
    assert!(sink.contains("Year has 1 missing values out of 3 total values."));
    assert!(sink.contains("Relative Humidity has 1 missing values out of 3 total values."));
}

#[test]
fn test_fractional_humidity_is_truncated_not_dropped() {
    let (imported, _) = run(rows_with_column(RELATIVE_HUMIDITY, &["55.5", "73"]));

    assert_eq!(
        imported.table.column("Relative Humidity").unwrap().cells,
        vec![Cell::Int(55), Cell::Int(73)]
    );
    assert!(imported.quality.is_empty());
}

#[test]
fn test_quality_counts_match_table() {
    let rows = vec![
        epw_row(&[(DRY_BULB, "99.9"), (WIND_SPEED, "999")]),
        epw_row(&[(DRY_BULB, "x"), (PRESSURE, "999999")]),
        epw_row(&[(WIND_DIRECTION, "361")]),
    ];
    let (imported, _) = run(rows);
    let registry = SchemaRegistry::epw();

    for column in &imported.table.columns {
        let name = &registry.lookup(&column.key).unwrap().name;
        let record = imported.quality.iter().find(|r| &r.column_name == name);
        match record {
            Some(record) => {
                assert_eq!(record.missing_count, column.missing_count());
                assert_eq!(record.total_count, 3);
            }
            None => assert_eq!(column.missing_count(), 0, "{name}"),
        }
    }

    let names: Vec<&str> = imported
        .quality
        .iter()
        .map(|r| r.column_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Dry Bulb Temperature",
            "Atmospheric Station Pressure",
            "Wind Direction",
            "Wind Speed"
        ]
    );
}

#[test]
fn test_pipeline_is_deterministic() {
    let rows = vec![
        epw_row(&[(DRY_BULB, "99.9")]),
        epw_row(&[(WIND_DIRECTION, "400"), (0, "x")]),
        epw_row(&[]),
    ];
    let (first, _) = run(rows.clone());
    let (second, _) = run(rows);

    assert_eq!(
        serde_json::to_string(&first.table).unwrap(),
        serde_json::to_string(&second.table).unwrap()
    );
    assert_eq!(first.quality, second.quality);
}

#[test]
fn test_narrow_table_uses_leading_schema_columns() {
    let rows: Vec<Vec<String>> = (0..3).map(|_| epw_row(&[])[..10].to_vec()).collect();
    let (imported, sink) = run(rows);

    assert_eq!(imported.table.width(), 10);
    assert_eq!(
        imported.table.column_keys().last(),
        Some("Atmospheric Station Pressure")
    );
    assert!(imported.quality.is_empty());
    assert!(sink.contains("applying the first 10 of 35 schema columns"));
}

#[test]
fn test_ragged_table_is_rejected() {
    let mut short = epw_row(&[]);
    short.truncate(20);
    let raw = RawTable::new(vec![epw_row(&[]), short, epw_row(&[])]);

    let mut sink = MemorySink::new();
    let result = ImportPipeline::new(SchemaRegistry::epw()).run(
        raw,
        SiteMetadata::default(),
        &mut sink,
    );

    assert_eq!(
        result,
        Err(PipelineError::Structural {
            row: 2,
            expected: 35,
            found: 20
        })
    );
    assert!(sink
        .entries
        .iter()
        .any(|(level, message)| *level == LogLevel::Error && message.contains("data row 2")));
}

#[test]
fn test_extra_columns_pass_through_unchecked() {
    let rows: Vec<Vec<String>> = ["", "n/a"]
        .iter()
        .map(|extra| {
            let mut row = epw_row(&[]);
            row.push(extra.to_string());
            row
        })
        .collect();
    let (imported, sink) = run(rows);

    assert_eq!(imported.table.width(), 36);
    assert_eq!(
        imported.table.column("Column 36").unwrap().cells,
        vec![Cell::Text(String::new()), Cell::Text("n/a".to_string())]
    );
    assert!(imported.quality.is_empty());
    assert!(sink.contains("1 columns beyond the schema"));
}

#[test]
fn test_registry_shared_across_threads() {
    let rows = rows_with_column(DRY_BULB, &["99.9", "12.5"]);

    let results: Vec<ImportedTable> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rows = rows.clone();
                scope.spawn(move || run(rows).0)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for imported in &results {
        assert_eq!(imported, &results[0]);
    }
}

#[test]
fn test_metadata_is_carried_through() {
    let metadata = SiteMetadata {
        longitude: -104.85,
        latitude: 39.57,
        elevation: 1793.0,
    };
    let mut sink = MemorySink::new();
    let imported = ImportPipeline::new(SchemaRegistry::epw())
        .run(RawTable::new(vec![epw_row(&[])]), metadata, &mut sink)
        .unwrap();

    assert_eq!(imported.metadata, metadata);
}
