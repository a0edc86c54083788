use pagecollect::runner::{Options, Runner};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(Options {
        origin: "http://localhost:5000".to_string(),
        paths: vec![
            "/api/players".to_string(),
            "/api/teams?year=2024".to_string(),
        ],
        page_size: Some(100),
        max_pages: Some(50),
        rate: 10,
        concurrency: 2,
        timeout_seconds: 5,
        ..Options::default()
    })?;
    let result = runner.run().await?;

    println!("Records: {}", result.total_records());
    for p in result.paths.iter() {
        println!(
            "{} {} records over {} pages ({})",
            p.path,
            p.outcome.records.len(),
            p.outcome.pages,
            p.outcome.stop.label()
        );
        for d in p.outcome.diagnostics.iter() {
            println!("  page {} dropped: {}", d.page, d.message);
        }
    }

    Ok(())
}
