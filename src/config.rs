//! Process-wide defaults. Everything here is plain configuration handed to
//! the pipeline entry points through the CLI; nothing reads these at use
//! sites directly.

pub const SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";

pub const DEFAULT_LANGUAGE: &str = "en";

/// Aggregation window, inclusive start, exclusive end.
pub const DEFAULT_START_YEAR: i32 = 1840;
pub const DEFAULT_END_YEAR: i32 = 1883;

pub const CAREER_TEMPLATE: &str = "Infobox ship career";
pub const CAREER_PARAMETERS: &[&str] = &[
    "Ship laid down",
    "Ship ordered",
    "Ship launched",
    "Ship christened",
    "Ship completed",
    "Ship fate",
    "Ship status",
    "Ship builder",
];

pub const CHARACTERISTICS_TEMPLATE: &str = "Infobox ship characteristics";
pub const CHARACTERISTICS_PARAMETERS: &[&str] =
    &["Ship displacement", "Ship length", "Ship speed"];

/// Ships operated by the fleet of interest, with optional manufacturer and
/// English Wikipedia sitelink; submarine and small-craft classes excluded.
pub const DEFAULT_QUERY: &str = r#"PREFIX wd: <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>

SELECT DISTINCT ?ship ?shipLabel ?manufacturerLabel ?sitelink
WHERE {
  ?ship wdt:P137 wd:Q172771 .

  OPTIONAL {
    ?ship wdt:P176 ?manufacturer.
  }
  OPTIONAL {
    ?sitelink schema:about ?ship.
    ?sitelink schema:isPartOf <https://en.wikipedia.org/>
  }
  FILTER NOT EXISTS {
    ?ship wdt:P31 wd:Q559026.
  }
  FILTER NOT EXISTS {
    ?ship wdt:P279* wd:Q32050.
  }
  FILTER NOT EXISTS {
    ?ship wdt:P279* wd:Q19623198
  }
  SERVICE wikibase:label {
    bd:serviceParam wikibase:language "en" .
  }
}"#;
