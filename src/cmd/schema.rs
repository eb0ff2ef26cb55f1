use crate::json_schema::{all_schemas, get_schema, schema_names};

pub fn run(command: Option<String>, list: bool) -> anyhow::Result<()> {
    if list {
        for name in schema_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    match command {
        Some(name) => match get_schema(&name) {
            Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
            None => anyhow::bail!(
                "no schema for command '{}'. Available: {}",
                name,
                schema_names().join(", ")
            ),
        },
        None => println!("{}", serde_json::to_string_pretty(&all_schemas())?),
    }

    Ok(())
}
