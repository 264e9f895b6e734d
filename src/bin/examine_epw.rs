use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};

use weather_file_importer::importers::{EpwReader, RawTableSource, EPW_HEADER_ROWS};
use weather_file_importer::log_sink::TracingSink;
use weather_file_importer::pipeline::ImportPipeline;
use weather_file_importer::schema::SchemaRegistry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = env::args().collect();
    let file_path = match args.get(1) {
        Some(path) => path.as_str(),
        None => return Err("usage: examine-epw <file.epw> [rows]".into()),
    };
    let sample_rows: usize = match args.get(2) {
        Some(n) => n.parse()?,
        None => 5,
    };

    println!("Opening EPW file: {file_path}");

    // Header records, shown raw
    println!("\nHeader records:");
    println!("{}", "=".repeat(100));
    let reader = BufReader::new(File::open(file_path)?);
    for (index, line) in reader.lines().take(EPW_HEADER_ROWS).enumerate() {
        let line = line?;
        let preview: String = line.chars().take(96).collect();
        println!("{:2}: {preview}", index + 1);
    }

    let import = EpwReader::new(file_path).load()?;
    println!(
        "\nSite: lat {}, lon {}, elevation {}",
        import.metadata.latitude, import.metadata.longitude, import.metadata.elevation
    );
    println!("Data rows: {}", import.raw.row_count());

    // Show each field of the first rows next to the column it maps to
    let registry = SchemaRegistry::epw();
    for (row_idx, row) in import.raw.rows.iter().take(sample_rows).enumerate() {
        println!("\n{}", "=".repeat(100));
        println!("Data row {} ({} fields)", row_idx + 1, row.len());
        println!("{}", "=".repeat(100));
        for (col_idx, field) in row.iter().enumerate() {
            let name = registry
                .at(col_idx)
                .map(|c| c.name.as_str())
                .unwrap_or("[unknown]");
            println!("Col {:3} {:<42} [{field}]", col_idx + 1, name);
        }
    }

    // Dry run of the cleaning pipeline, reported through tracing only
    println!("\n{}", "=".repeat(100));
    let imported =
        ImportPipeline::new(registry).run(import.raw, import.metadata, &mut TracingSink)?;
    println!(
        "Cleaned {} rows, {} missing cells across {} columns",
        imported.table.row_count,
        imported.table.total_missing(),
        imported.quality.len()
    );

    Ok(())
}
