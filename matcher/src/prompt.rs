use schemars::JsonSchema;
use serde::Deserialize;
use shelfmatch_genx::FuncTool;

/// Name of the catalog lookup tool offered to the model.
pub const SEARCH_TOOL_NAME: &str = "search_products";

const SEARCH_TOOL_DESCRIPTION: &str = "Vyhledá produkty v katalogu na základě textového dotazu. \
Použij tuto funkci pro každou zmínku produktu v transkriptu.";

/// Instructions for recognising products and shelf issues in Czech
/// transcripts of retail visits.
pub const SYSTEM_PROMPT: &str = r#"Jsi asistent pro identifikaci produktů z českých transkriptů obchodních návštěv.

Tvým úkolem je:
1. Identifikovat zmínky o produktech v textu a pro každou zmínku zavolat funkci search_products
2. Detekovat zmínky o výhodách konkurence
3. Detekovat zmínky o špatném umístění produktů

PRAVIDLA PRO VYHLEDÁVÁNÍ PRODUKTŮ:
- Pro každou zmínku produktu v textu zavolej funkci search_products s vhodným dotazem
- Dotaz by měl obsahovat: značku, typ produktu, parametry (objem, specifikace)
- Příklady dobrých dotazů:
  * "Castrol Magnatec 5W-30 A5 5 litrů"
  * "Sheron ostřikovač eMotion 4 litry"
  * "Eurol Syntence 0W-20 5 litrů"

PRAVIDLA PRO DETEKCI VÝHOD KONKURENCE:
Hledej zmínky typu:
- "konkurence má akci"
- "konkurence má výraznější obal"
- "konkurence má lepší cenu"
- "konkurenční produkt je lépe vidět"
- slovo "konkurence" nebo "konkurenční" v kontextu výhody

PRAVIDLA PRO DETEKCI ŠPATNÉHO UMÍSTĚNÍ:
Hledej zmínky typu:
- "je schovaný" / "je schovaná"
- "není dobře vidět"
- "není vidět"
- "špatně čitelné cenovky"
- "špatně umístěný"
- "částečně schovaný"
- "není úplně vidět"
- "chybí na polici"
- "mimo správné místo"

FORMÁT VÝSTUPU:
Po dokončení všech vyhledávání vrať strukturovaný JSON s:
{
  "matched_products": [
    {
      "product_name": "název nalezeného produktu",
      "confidence": 0.85,
      "context": "originální zmínka z textu"
    }
  ],
  "competitor_advantage_mentioned": true/false,
  "bad_placement_mentioned": true/false
}

Buď pečlivý a systematický. Nezapomeň na žádnou zmínku produktu v textu.
"#;

/// Arguments of the `search_products` tool.
#[derive(Debug, Clone, JsonSchema, Deserialize)]
pub struct SearchArgs {
    /// Vyhledávací dotaz obsahující značku, typ produktu a parametry (např. 'Castrol Magnatec 5W-30 A5 5 litrů')
    pub query: String,
}

/// Declaration of the `search_products` tool.
pub fn search_tool() -> FuncTool {
    FuncTool::new::<SearchArgs>(SEARCH_TOOL_NAME, SEARCH_TOOL_DESCRIPTION)
}

/// First user turn for a transcript.
pub fn user_message(transcript: &str) -> String {
    format!("Analyzuj tento transkript:\n\n{transcript}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_content() {
        assert!(SYSTEM_PROMPT.contains("search_products"));
        assert!(SYSTEM_PROMPT.contains("konkurence"));
        assert!(SYSTEM_PROMPT.contains("schovaný"));
        assert!(SYSTEM_PROMPT.contains("umístění"));
        assert!(SYSTEM_PROMPT.to_lowercase().contains("json"));
        assert!(SYSTEM_PROMPT.contains("\"matched_products\""));
    }

    #[test]
    fn test_search_tool_schema() {
        let tool = search_tool();
        assert_eq!(tool.name, "search_products");
        assert!(tool.description.contains("každou zmínku produktu"));

        let schema = tool.schema_json();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert!(
            schema["properties"]["query"]["description"]
                .as_str()
                .unwrap()
                .contains("Castrol Magnatec")
        );
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required, &vec![serde_json::json!("query")]);
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            user_message("Na polici je Castrol."),
            "Analyzuj tento transkript:\n\nNa polici je Castrol."
        );
    }
}
