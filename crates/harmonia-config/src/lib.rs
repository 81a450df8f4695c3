use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use harmonia::aspects::{AspectConfig, AspectKind, AspectSelection};
use harmonia::chart::{EngineSettings, RenderOptions};
use harmonia::ephemeris::ChartConfig;
use harmonia::score::{Role, WeightRule, WeightTable};
use harmonia::Point;

/// Fully resolved settings for the engine and its collaborators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarmoniaSettings {
    pub engine: EngineSettings,
    /// JSON file of precomputed position sets
    pub positions_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RootConfigToml {
    #[serde(default)]
    chart: ChartConfig,
    #[serde(default)]
    aspects: AspectsToml,
    #[serde(default)]
    scoring: ScoringToml,
    #[serde(default)]
    render: RenderOptions,
    #[serde(default)]
    ephemeris: EphemerisToml,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AspectsToml {
    #[serde(default)]
    selection: AspectSelection,
    /// Point names; aliases such as `asc` and `mc` are accepted
    #[serde(default)]
    points: Option<Vec<String>>,
    /// Orb overrides keyed by aspect name
    #[serde(default)]
    orbs: BTreeMap<String, f64>,
    #[serde(default)]
    minor_orb_cap: Option<f64>,
    #[serde(default)]
    angle_orb: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScoringToml {
    #[serde(default)]
    destiny_sign_bonus: Option<f64>,
    /// Start from an empty table instead of the Discepolo weights
    #[serde(default)]
    replace_defaults: bool,
    #[serde(default)]
    rules: Vec<RuleToml>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleToml {
    first: Role,
    second: Role,
    aspect: AspectKind,
    weight: f64,
    #[serde(default)]
    tight_orb: Option<f64>,
    #[serde(default)]
    tight_weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EphemerisToml {
    #[serde(default)]
    positions: Option<PathBuf>,
}

const CONFIG_PATHS: [&str; 2] = ["configs/harmonia.toml", "../../configs/harmonia.toml"];

/// Try common relative paths for `configs/harmonia.toml`.
pub fn read_config_text() -> anyhow::Result<String> {
    for p in &CONFIG_PATHS {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load harmonia.toml from {:?}", CONFIG_PATHS);
}

/// Load settings from `path`, or from the default locations when no path is
/// given. Defaults apply when no default file exists.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<HarmoniaSettings> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?,
        None => match read_config_text() {
            Ok(text) => text,
            Err(_) => return Ok(HarmoniaSettings::default()),
        },
    };
    from_toml_str(&text)
}

pub fn from_toml_str(text: &str) -> anyhow::Result<HarmoniaSettings> {
    let root: RootConfigToml =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse harmonia.toml: {e}"))?;

    let engine = EngineSettings {
        chart: root.chart,
        aspects: aspect_config(&root.aspects)?,
        weights: weight_table(&root.scoring)?,
        render: root.render,
        ..EngineSettings::default()
    };
    engine
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid harmonia.toml: {e}"))?;

    Ok(HarmoniaSettings {
        engine,
        positions_path: root.ephemeris.positions,
    })
}

fn aspect_config(cfg: &AspectsToml) -> anyhow::Result<AspectConfig> {
    let mut config = AspectConfig::for_selection(cfg.selection);

    if let Some(names) = &cfg.points {
        let points = names
            .iter()
            .map(|name| name.parse::<Point>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("aspects.points: {e}"))?;
        config = config.with_points(points);
    }

    for (name, orb) in &cfg.orbs {
        let kind = parse_aspect_kind(name)
            .ok_or_else(|| anyhow::anyhow!("aspects.orbs: unknown aspect {name:?}"))?;
        if cfg.selection == AspectSelection::Major && !kind.is_major() {
            anyhow::bail!(
                "aspects.orbs sets an orb for minor aspect {name:?} but selection is \"major\""
            );
        }
        config = config.with_orb(kind, *orb);
    }

    if let Some(cap) = cfg.minor_orb_cap {
        config = config.with_minor_orb_cap(cap);
    }
    if let Some(orb) = cfg.angle_orb {
        config = config.with_angle_orb(orb);
    }
    Ok(config)
}

fn weight_table(cfg: &ScoringToml) -> anyhow::Result<WeightTable> {
    let mut table = if cfg.replace_defaults {
        WeightTable {
            rules: Vec::new(),
            ..WeightTable::discepolo()
        }
    } else {
        WeightTable::discepolo()
    };

    for rule in &cfg.rules {
        let mut weight = WeightRule::new(rule.first, rule.second, rule.aspect, rule.weight);
        match (rule.tight_orb, rule.tight_weight) {
            (Some(orb), Some(tight)) => weight = weight.with_tight(orb, tight),
            (None, None) => {}
            _ => anyhow::bail!(
                "scoring rule {:?}-{:?} {} needs both tight_orb and tight_weight",
                rule.first,
                rule.second,
                rule.aspect
            ),
        }
        // A configured rule replaces the default one for the same combination
        table.rules.retain(|existing| !same_combination(existing, &weight));
        table.rules.push(weight);
    }

    if let Some(bonus) = cfg.destiny_sign_bonus {
        table = table.with_destiny_sign_bonus(bonus);
    }
    Ok(table)
}

fn same_combination(a: &WeightRule, b: &WeightRule) -> bool {
    a.aspect == b.aspect
        && ((a.first == b.first && a.second == b.second)
            || (a.first == b.second && a.second == b.first))
}

fn parse_aspect_kind(name: &str) -> Option<AspectKind> {
    let id = name.trim().to_lowercase().replace('-', "_");
    AspectKind::all().find(|kind| kind.as_str() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonia::chart::{Language, Theme};
    use harmonia::ephemeris::{HouseSystem, SiderealMode, ZodiacType};

    #[test]
    fn test_empty_config_uses_defaults() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, HarmoniaSettings::default());
    }

    #[test]
    fn test_full_config() {
        let text = r#"
            [chart]
            zodiac = "sidereal"
            sidereal_mode = "lahiri"
            house_system = "whole_sign"

            [aspects]
            selection = "major_and_minor"
            points = ["sun", "moon", "asc", "mc"]
            minor_orb_cap = 0.5
            angle_orb = 3.0

            [aspects.orbs]
            trine = 6.0
            semi-sextile = 2.0

            [scoring]
            destiny_sign_bonus = 3.0

            [[scoring.rules]]
            first = "venus"
            second = "mars"
            aspect = "trine"
            weight = 6.0
            tight_orb = 1.0
            tight_weight = 9.0

            [render]
            theme = "dark-high-contrast"
            language = "FR"
            wheel_only = true

            [ephemeris]
            positions = "data/positions.json"
        "#;

        let settings = from_toml_str(text).unwrap();
        let engine = &settings.engine;

        assert_eq!(engine.chart.zodiac, ZodiacType::Sidereal);
        assert_eq!(engine.chart.sidereal_mode, Some(SiderealMode::Lahiri));
        assert_eq!(engine.chart.house_system, HouseSystem::WholeSign);

        assert_eq!(
            engine.aspects.active_points,
            vec![Point::Sun, Point::Moon, Point::Ascendant, Point::Midheaven]
        );
        let orb_of = |kind: AspectKind| {
            engine
                .aspects
                .definitions
                .iter()
                .find(|d| d.kind == kind)
                .map(|d| d.orb)
        };
        assert_eq!(orb_of(AspectKind::Trine), Some(6.0));
        // cap applies after the override
        assert_eq!(orb_of(AspectKind::SemiSextile), Some(0.5));
        assert_eq!(orb_of(AspectKind::Quincunx), Some(0.5));
        assert_eq!(engine.aspects.angle_orb, Some(3.0));

        assert_eq!(engine.weights.destiny_sign_bonus, 3.0);
        let venus_mars: Vec<_> = engine
            .weights
            .rules
            .iter()
            .filter(|r| r.first == Role::Venus && r.aspect == AspectKind::Trine)
            .collect();
        assert_eq!(venus_mars.len(), 1);
        assert_eq!(venus_mars[0].weight, 6.0);
        assert_eq!(venus_mars[0].weight_for(0.5), 9.0);

        assert_eq!(engine.render.theme, Theme::DarkHighContrast);
        assert_eq!(engine.render.language, Language::Fr);
        assert!(engine.render.wheel_only);
        assert_eq!(
            settings.positions_path,
            Some(PathBuf::from("data/positions.json"))
        );
    }

    #[test]
    fn test_replace_default_weights() {
        let text = r#"
            [scoring]
            replace_defaults = true

            [[scoring.rules]]
            first = "moon"
            second = "venus"
            aspect = "conjunction"
            weight = 5.0
        "#;
        let settings = from_toml_str(text).unwrap();
        assert_eq!(settings.engine.weights.rules.len(), 1);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(from_toml_str("[aspects]\npoints = [\"vulcan\"]").is_err());
        assert!(from_toml_str("[aspects.orbs]\nbogus = 1.0").is_err());
        assert!(from_toml_str("[aspects.orbs]\nquintile = 1.0").is_err());
        assert!(from_toml_str("[aspects.orbs]\ntrine = -1.0").is_err());
        assert!(from_toml_str("[chart]\nzodiac = \"sidereal\"").is_err());
        assert!(from_toml_str("[scoring]\nreplace_defaults = true").is_err());
        assert!(from_toml_str("[unknown]\nkey = 1").is_err());
        assert!(from_toml_str(
            "[[scoring.rules]]\nfirst = \"sun\"\nsecond = \"sun\"\naspect = \"trine\"\nweight = 1.0\ntight_orb = 1.0"
        )
        .is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = std::env::temp_dir().join(format!("harmonia-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("harmonia.toml");
        fs::write(&path, "[render]\ntheme = \"light\"\n").unwrap();

        let settings = load_config(Some(&path)).unwrap();
        assert_eq!(settings.engine.render.theme, Theme::Light);

        let missing = load_config(Some(&dir.join("missing.toml")));
        assert!(missing.is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
