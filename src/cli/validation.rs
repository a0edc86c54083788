use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.rate == Some(0) {
        return Err("invalid rate, expected positive integer".to_string());
    }
    if args.concurrency == Some(0) {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    if args.max_pages == Some(0) {
        return Err("invalid max-pages, expected positive integer".to_string());
    }
    if args.page_size == Some(0) {
        return Err("invalid page-size, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    if let Some(raw) = args.page_param.as_deref() {
        crate::utils::parse_query_param_name(raw)
            .map_err(|e| format!("invalid --page-param '{raw}': {e}"))?;
    }
    if let Some(raw) = args.page_size_param.as_deref() {
        crate::utils::parse_query_param_name(raw)
            .map_err(|e| format!("invalid --page-size-param '{raw}': {e}"))?;
    }
    if let Some(raw) = args.header.as_deref() {
        crate::utils::parse_header(raw).map_err(|e| format!("invalid --header '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json or jsonl"
            ));
        }
    }
    Ok(())
}
