//! E2E tests calling a real Azure OpenAI chat deployment.
//! Run with: AZURE_OPENAI_ENDPOINT=... AZURE_OPENAI_API_KEY=... \
//!   cargo test -p shelfmatch-genx --test e2e -- --ignored

use schemars::JsonSchema;
use serde::Deserialize;
use shelfmatch_genx::openai::{OpenAIConfig, OpenAIGenerator};
use shelfmatch_genx::{FuncTool, Generator, ModelContextBuilder, ModelParams, Reply};

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn generator() -> Option<OpenAIGenerator> {
    let endpoint = env("AZURE_OPENAI_ENDPOINT")?;
    let key = env("AZURE_OPENAI_API_KEY")?;
    let deployment = env("AZURE_OPENAI_DEPLOYMENT_NAME").unwrap_or_else(|| "gpt-4o".into());
    let version = env("AZURE_OPENAI_API_VERSION").unwrap_or_else(|| "2024-08-01-preview".into());
    Some(OpenAIGenerator::new(OpenAIConfig::azure(
        endpoint, key, deployment, version,
    )))
}

#[derive(Deserialize, JsonSchema)]
struct Lookup {
    /// Název produktu
    query: String,
}

#[tokio::test]
#[ignore]
async fn e2e_ping() {
    let generator = generator().expect("AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY required");
    let usage = generator.ping().await.expect("ping failed");
    assert!(usage.prompt_token_count > 0);
}

#[tokio::test]
#[ignore]
async fn e2e_tool_call() {
    let generator = generator().expect("AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY required");

    let mut mcb = ModelContextBuilder::new();
    mcb.prompt_text(
        "system",
        "Pro každý zmíněný produkt zavolej funkci lookup_product.",
    );
    mcb.user_text("user", "Na polici je Castrol Magnatec 5W-30.");
    mcb.add_tool(FuncTool::new::<Lookup>("lookup_product", "Vyhledá produkt v katalogu."));
    mcb.set_params(ModelParams::new().with_temperature(0.0).with_max_tokens(200));
    let ctx = mcb.build();

    let (_, reply) = generator.generate(&ctx).await.expect("generate failed");
    let Reply::ToolCalls(calls) = reply else {
        panic!("expected tool calls, got {reply:?}");
    };
    assert!(!calls.is_empty());
    assert_eq!(calls[0].func_call.name, "lookup_product");
    let args: Lookup = calls[0].func_call.parse_args().expect("arguments are not JSON");
    assert!(args.query.to_lowercase().contains("castrol"));
}
