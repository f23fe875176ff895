// Event-type taxonomy: maps free-text storm labels onto the official
// event classes through an ordered rule table. First matching rule wins.
use crate::error::{Result, StormError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Catch-all class for labels no rule recognises.
pub const OTHER: &str = "Other";

/// The 48 official storm event classes.
pub const OFFICIAL_EVENT_TYPES: [&str; 48] = [
    "Astronomical Low Tide",
    "Avalanche",
    "Blizzard",
    "Coastal Flood",
    "Cold/Wind Chill",
    "Debris Flow",
    "Dense Fog",
    "Dense Smoke",
    "Drought",
    "Dust Devil",
    "Dust Storm",
    "Excessive Heat",
    "Extreme Cold/Wind Chill",
    "Flash Flood",
    "Flood",
    "Frost/Freeze",
    "Funnel Cloud",
    "Freezing Fog",
    "Hail",
    "Heat",
    "Heavy Rain",
    "Heavy Snow",
    "High Surf",
    "High Wind",
    "Hurricane (Typhoon)",
    "Ice Storm",
    "Lake-Effect Snow",
    "Lakeshore Flood",
    "Lightning",
    "Marine Hail",
    "Marine High Wind",
    "Marine Strong Wind",
    "Marine Thunderstorm Wind",
    "Rip Current",
    "Seiche",
    "Sleet",
    "Storm Surge/Tide",
    "Strong Wind",
    "Thunderstorm Wind",
    "Tornado",
    "Tropical Depression",
    "Tropical Storm",
    "Tsunami",
    "Volcanic Ash",
    "Waterspout",
    "Wildfire",
    "Winter Storm",
    "Winter Weather",
];

// Ordered: specific phrases sit above the generic words they contain
// (MARINE HAIL before HAIL, FLASH before FLOOD, WIND CHILL before WIND).
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("MARINE HAIL", "Marine Hail"),
    ("MARINE HIGH WIND", "Marine High Wind"),
    ("MARINE STRONG WIND", "Marine Strong Wind"),
    ("MARINE (TSTM|THUNDERSTORM)", "Marine Thunderstorm Wind"),
    ("ASTRONOMICAL LOW|LOW TIDE|BLOW-OUT TIDE", "Astronomical Low Tide"),
    ("AVALANC", "Avalanche"),
    ("BLIZZARD", "Blizzard"),
    ("LAKE ?SHORE FLOOD", "Lakeshore Flood"),
    ("STORM SURGE|STORM TIDE|COASTAL ?SURGE|HIGH TIDE", "Storm Surge/Tide"),
    ("COASTAL|CSTL|TIDAL FLOOD|BEACH|EROSION", "Coastal Flood"),
    ("TSUNAMI", "Tsunami"),
    ("SEICHE", "Seiche"),
    ("HURRICANE|TYPHOON", "Hurricane (Typhoon)"),
    ("TROPICAL STORM", "Tropical Storm"),
    ("TROPICAL DEPRESSION", "Tropical Depression"),
    ("TORNADO|TORNDAO|LANDSPOUT", "Tornado"),
    ("WATER ?SPOUT|WAYTERSPOUT", "Waterspout"),
    ("FUNNEL", "Funnel Cloud"),
    ("DUST DEVIL|DUST DEVEL", "Dust Devil"),
    ("DUST|SAND ?STORM|SAHARAN", "Dust Storm"),
    (r"VOLCAN|\bVOG\b", "Volcanic Ash"),
    ("SMOKE", "Dense Smoke"),
    ("FREEZING FOG|ICE FOG", "Freezing Fog"),
    ("FOG", "Dense Fog"),
    ("RIP CURRENT", "Rip Current"),
    (
        "SURF|SWELL|HIGH SEAS|ROUGH SEAS|HEAVY SEAS|ROGUE WAVE|HIGH WAVES|MARINE ACCIDENT|MARINE MISHAP",
        "High Surf",
    ),
    ("LAKE.?EFFECT", "Lake-Effect Snow"),
    ("ICE STORM|GLAZE", "Ice Storm"),
    ("WINTER STORM", "Winter Storm"),
    (
        "WINTER WEATHER|WINTRY|WINTER MIX|FREEZING (RAIN|DRIZZLE|SPRAY)|ICY ROADS|ICE ON ROAD|ICE ROADS|BLACK ICE|MIXED PRECIP|LIGHT SNOW|SNOW SQUALL",
        "Winter Weather",
    ),
    ("SLEET", "Sleet"),
    ("SNOW", "Heavy Snow"),
    (
        "EXTREME (COLD|WIND ?CHILL)|RECORD COLD|EXCESSIVE COLD|HYPOTHERMIA",
        "Extreme Cold/Wind Chill",
    ),
    ("FROST|FREEZE", "Frost/Freeze"),
    ("COLD|WIND ?CHILL|LOW TEMPERATURE|COOL", "Cold/Wind Chill"),
    (
        "EXCESSIVE HEAT|EXTREME HEAT|RECORD HEAT|HEAT WAVE|HYPERTHERMIA|RECORD HIGH|RECORD WARM",
        "Excessive Heat",
    ),
    (r"HEAT|WARM|\bHOT\b", "Heat"),
    ("FLASH", "Flash Flood"),
    (
        "FLOOD|FLD|URBAN|STREAM|HIGH WATER|RISING WATER|DAM BREAK|DAM FAILURE|ICE JAM",
        "Flood",
    ),
    ("NON.?(TSTM|SEVERE)", "Strong Wind"),
    (
        "MICROBURST|DOWNBURST|GUSTNADO|TSTM|THUNDER|TUNDERSTORM|THUDERSTORM|THUNERSTORM|THUNDEERSTORM|WIND DAMAGE",
        "Thunderstorm Wind",
    ),
    ("HAIL", "Hail"),
    ("LIGHTNING|LIGHTING|LIGNTNING", "Lightning"),
    ("DROUGHT|DRY|DRIEST", "Drought"),
    ("RAIN|PRECIP|SHOWER|WET|DOWNPOUR", "Heavy Rain"),
    ("FIRE", "Wildfire"),
    (
        "LAND ?SLIDE|LANDSLUMP|MUD ?SLIDE|ROCK ?SLIDE|DEBRIS FLOW",
        "Debris Flow",
    ),
    ("HIGH ?WIND", "High Wind"),
    (r"WIND|GUSTY|\bWND\b", "Strong Wind"),
    (r"\bICE\b|\bICY\b", "Winter Weather"),
];

static BUILTIN: Lazy<Taxonomy> = Lazy::new(|| {
    Taxonomy::from_rules(BUILTIN_RULES.iter().copied())
        .expect("built-in taxonomy rules are valid")
});

/// One ordered (pattern, class) entry in the rule table.
#[derive(Debug, Clone)]
pub struct TaxonomyRule {
    pub pattern: Regex,
    pub event_type: String,
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    pattern: String,
    event_type: String,
}

/// Ordered rule table. Immutable once built.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    rules: Vec<TaxonomyRule>,
}

impl Taxonomy {
    /// The default table shipped with the crate.
    pub fn builtin() -> &'static Taxonomy {
        &BUILTIN
    }

    /// Build a table from `(pattern, class)` pairs, keeping their order.
    ///
    /// Every class must be one of [`OFFICIAL_EVENT_TYPES`] or [`OTHER`], and
    /// every pattern must be a non-empty, valid regular expression.
    pub fn from_rules<I, P, C>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let mut out = Vec::new();
        for (pattern, class) in rules {
            let (pattern, class) = (pattern.as_ref().trim(), class.as_ref().trim());
            if pattern.is_empty() {
                return Err(StormError::InvalidRule {
                    pattern: pattern.to_string(),
                    reason: "empty pattern".to_string(),
                });
            }
            if !is_known_class(class) {
                return Err(StormError::UnknownEventClass(class.to_string()));
            }
            let regex = Regex::new(pattern).map_err(|e| StormError::InvalidRule {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            out.push(TaxonomyRule {
                pattern: regex,
                event_type: class.to_string(),
            });
        }
        Ok(Taxonomy { rules: out })
    }

    /// Load a rule table from a CSV file with a `pattern,event_type` header.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let mut pairs = Vec::new();
        for row in rdr.deserialize::<RuleRow>() {
            let row = row?;
            pairs.push((row.pattern, row.event_type));
        }
        Self::from_rules(pairs)
    }

    pub fn rules(&self) -> &[TaxonomyRule] {
        &self.rules
    }

    /// Class of the first rule whose pattern matches `label`, or [`OTHER`].
    ///
    /// `label` is expected already normalized (uppercase, trimmed, single
    /// spaces).
    pub fn classify(&self, label: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(label))
            .map(|rule| rule.event_type.as_str())
            .unwrap_or(OTHER)
    }
}

pub fn is_known_class(class: &str) -> bool {
    class == OTHER || OFFICIAL_EVENT_TYPES.contains(&class)
}

/// Memoizing front for [`Taxonomy::classify`].
///
/// The dataset repeats a few hundred labels across hundreds of thousands of
/// rows, so each distinct label is scanned against the table only once.
pub struct ClassCache<'a> {
    taxonomy: &'a Taxonomy,
    memo: HashMap<String, String>,
    hits: usize,
    misses: usize,
}

impl<'a> ClassCache<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        ClassCache {
            taxonomy,
            memo: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn classify(&mut self, label: &str) -> &str {
        if self.memo.contains_key(label) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let class = self.taxonomy.classify(label).to_string();
            self.memo.insert(label.to_string(), class);
        }
        self.memo[label].as_str()
    }

    pub fn distinct_labels(&self) -> usize {
        self.memo.len()
    }

    /// Labels seen so far that fell through to [`OTHER`], sorted.
    pub fn unmatched_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .memo
            .iter()
            .filter(|(_, class)| class.as_str() == OTHER)
            .map(|(label, _)| label.as_str())
            .collect();
        labels.sort_unstable();
        labels
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
