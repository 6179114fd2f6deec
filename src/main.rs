use anyhow::{bail, Result};
use select_sql::{Grammar, KeywordMode, ParserConfig, SelectParser};

fn main() -> Result<()> {
    // Parse arguments
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = ParserConfig::default();
    let mut query = None;
    for arg in &args {
        match arg.as_str() {
            "--case-sensitive" => config.keyword_mode = KeywordMode::CaseSensitive,
            "--grammar" => {
                // Input for diagram tooling: the rule list as JSON.
                println!("{}", serde_json::to_string_pretty(Grammar::select())?);
                return Ok(());
            }
            "--ebnf" => {
                print!("{}", Grammar::select());
                return Ok(());
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            text => {
                if query.is_some() {
                    bail!("Expected a single query argument; quote the query");
                }
                query = Some(text);
            }
        }
    }

    let Some(query) = query else {
        bail!("Missing <query>. Usage: select-sql [--case-sensitive] <query> | --grammar | --ebnf");
    };

    let statement = SelectParser::new(config).parse(query)?;
    println!("{}", serde_json::to_string_pretty(&statement)?);
    Ok(())
}
