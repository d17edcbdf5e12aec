//! Advisory message composition.
//!
//! The advisory is one of five fixed message templates, filled in from a
//! machine-category profile (picked by keyword in the machine name) and a
//! usage-frequency commentary block. Template choice goes through a
//! [`TemplatePicker`] so callers decide where the randomness comes from.

use chrono::{DateTime, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::codec::encode_date;
use crate::models::{MachineRecord, UsageFrequency};

/// Wording describing how a category of machine degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineProfile {
    pub primary: &'static str,
    pub consequence: &'static str,
    pub components: &'static str,
    pub cost_impact: &'static str,
    pub vibration: &'static str,
    pub wear: &'static str,
    pub failures: &'static str,
    pub efficiency: &'static str,
}

/// Wording tied to how often the machine runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyCommentary {
    pub issue: String,
    pub production: &'static str,
    pub recommendation: &'static str,
}

pub const DEFAULT_PROFILE: MachineProfile = MachineProfile {
    primary: "Lubrication system degradation and bearing wear",
    consequence: "catastrophic bearing failure and spindle damage",
    components: "drive belts, filtration systems, and hydraulic seals",
    cost_impact: "$15,000-50,000 in emergency repairs",
    vibration: "Abnormal vibration patterns and noise levels",
    wear: "Accelerated component wear and misalignment",
    failures: "unplanned downtime (8-12 hours), scrap production, safety hazards",
    efficiency: "15-25% performance and energy",
};

/// Keyword groups and the profile they select. First match wins.
pub static MACHINE_PROFILES: &[(&[&str], MachineProfile)] = &[
    (
        &["cnc", "mill", "lathe"],
        MachineProfile {
            primary: "Spindle bearing deterioration and coolant contamination",
            consequence: "spindle failure and precision loss (±0.001\")",
            components: "tool changers, spindle assemblies, and coolant systems",
            cost_impact: "$25,000-75,000 in spindle replacement",
            vibration: "Spindle vibration exceeding 0.5mm/s threshold",
            wear: "Tool holder taper wear and chuck jaw deterioration",
            failures: "dimensional accuracy loss, surface finish defects, automatic tool changer jamming",
            efficiency: "20-30% cutting speed and precision",
        },
    ),
    (
        &["press", "stamp", "punch"],
        MachineProfile {
            primary: "Hydraulic pressure fluctuations and die wear patterns",
            consequence: "press tonnage loss and part quality deviation",
            components: "hydraulic cylinders, pressure sensors, and die sets",
            cost_impact: "$10,000-40,000 in hydraulic system repair",
            vibration: "Frame vibration and tonnage inconsistency",
            wear: "Die wear exceeding 0.002\" tolerance and guide bushing play",
            failures: "part dimensional variance, die cracking, hydraulic seal rupture",
            efficiency: "10-20% cycle time and tonnage",
        },
    ),
    (
        &["weld", "robot"],
        MachineProfile {
            primary: "Arc stability degradation and robot positioning drift",
            consequence: "weld penetration inconsistency and joint failure",
            components: "welding cables, robot encoders, and gas delivery systems",
            cost_impact: "$8,000-30,000 in robot recalibration",
            vibration: "Robot arm oscillation and torch positioning error",
            wear: "Contact tip deterioration and cable flexibility loss",
            failures: "weld defects (porosity, underfill), robot crash events, gas flow interruption",
            efficiency: "25-35% welding speed and quality",
        },
    ),
    (
        &["pump", "compressor", "motor"],
        MachineProfile {
            primary: "Motor bearing degradation and impeller wear",
            consequence: "pump cavitation and system pressure loss",
            components: "mechanical seals, impellers, and motor windings",
            cost_impact: "$5,000-25,000 in pump rebuild",
            vibration: "Bearing vibration exceeding ISO 10816 standards",
            wear: "Impeller erosion and seal face deterioration",
            failures: "system pressure drop, fluid contamination, motor burnout",
            efficiency: "15-25% flow rate and energy",
        },
    ),
    (
        &["conveyor", "belt"],
        MachineProfile {
            primary: "Belt tension degradation and roller bearing wear",
            consequence: "material handling disruption and belt slippage",
            components: "drive rollers, belt tensioners, and motor couplings",
            cost_impact: "$3,000-15,000 in conveyor rebuild",
            vibration: "Roller wobble and belt tracking issues",
            wear: "Belt edge fraying and roller surface wear",
            failures: "material spillage, belt breakage, production line stoppage",
            efficiency: "10-15% throughput and reliability",
        },
    ),
];

/// The five advisory templates. Placeholders are `{name}` tokens.
pub const TEMPLATES: [&str; 5] = [
    "⚠️ CRITICAL ALERT: {machine} operating {days} days since last service. {primary} Risk of {consequence} increasing. Schedule maintenance by {next_date} to prevent production line shutdown and quality defects.",
    "🔧 PREDICTIVE ANALYSIS: {machine} shows elevated risk patterns. {issue} Immediate attention required for {components}. Delayed maintenance may result in {cost_impact} and compromise ISO quality standards.",
    "📊 MANUFACTURING ALERT: {machine} approaching critical maintenance threshold. {vibration} detected. {production} Schedule maintenance during next planned downtime to avoid emergency repairs costing 3-5x more.",
    "🚨 PRODUCTION RISK: {machine} requires immediate inspection. {wear} observed in similar {frequency} usage patterns. Failure to maintain by {next_date} may cause: {failures}. Current OEE at risk.",
    "⚙️ MAINTENANCE OPTIMIZATION: {machine} operating beyond optimal service interval ({days} days). {efficiency} degradation detected. {recommendation} Proactive maintenance now prevents 40% higher repair costs and part shortages.",
];

/// Chooses which of `len` templates to use.
pub trait TemplatePicker {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform random choice.
#[derive(Debug)]
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    /// Seeded for reproducible output, or from OS entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        RandomPicker { rng }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TemplatePicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed sequence of indices, cycling when exhausted.
///
/// Indices are reduced modulo `len`.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    seq: Vec<usize>,
    pos: usize,
}

impl FixedSequence {
    pub fn new(seq: impl Into<Vec<usize>>) -> Self {
        FixedSequence {
            seq: seq.into(),
            pos: 0,
        }
    }
}

impl TemplatePicker for FixedSequence {
    fn pick(&mut self, len: usize) -> usize {
        if self.seq.is_empty() {
            return 0;
        }
        let v = self.seq[self.pos % self.seq.len()];
        self.pos += 1;
        v % len
    }
}

/// Selects the profile whose keywords appear in `machine_name`, ignoring case.
pub fn machine_profile(machine_name: &str) -> &'static MachineProfile {
    let lower = machine_name.to_lowercase();
    MACHINE_PROFILES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, profile)| profile)
        .unwrap_or(&DEFAULT_PROFILE)
}

pub fn frequency_commentary(frequency: &UsageFrequency, days_since_service: i64) -> FrequencyCommentary {
    match frequency {
        UsageFrequency::Daily => FrequencyCommentary {
            issue: "High-duty cycle operation accelerating component fatigue.".to_string(),
            production: "Continuous operation requires immediate intervention.",
            recommendation: "24/7 operation demands predictive maintenance protocols.",
        },
        UsageFrequency::Weekly => FrequencyCommentary {
            issue: format!(
                "Regular operation ({} days) showing normal wear progression.",
                days_since_service
            ),
            production: "Weekly production cycles allow maintenance window flexibility.",
            recommendation: "Moderate usage permits scheduled maintenance optimization.",
        },
        UsageFrequency::Monthly => FrequencyCommentary {
            issue: "Intermittent operation may cause seal drying and lubrication issues.".to_string(),
            production: "Low utilization requires attention to standby deterioration.",
            recommendation: "Periodic operation needs preservation maintenance focus.",
        },
        UsageFrequency::Other(_) => FrequencyCommentary {
            issue: "Usage pattern analysis incomplete.".to_string(),
            production: "Production schedule requires maintenance coordination.",
            recommendation: "Standard maintenance protocols recommended.",
        },
    }
}

/// Whole days from the service date (midnight UTC) to `now`, rounded down.
///
/// Negative when the service date lies in the future.
pub fn days_since_service(last_serviced: NaiveDate, now: DateTime<Utc>) -> i64 {
    let serviced = last_serviced.and_time(chrono::NaiveTime::MIN).and_utc();
    (now - serviced).num_seconds().div_euclid(86_400)
}

/// Everything a template can refer to.
#[derive(Debug, Clone)]
pub struct AdvisoryContext<'a> {
    pub machine: &'a MachineRecord,
    pub days_since_service: i64,
    pub next_task_date: NaiveDate,
    pub profile: &'static MachineProfile,
    pub commentary: FrequencyCommentary,
}

impl<'a> AdvisoryContext<'a> {
    pub fn new(machine: &'a MachineRecord, next_task_date: NaiveDate, now: DateTime<Utc>) -> Self {
        let days = days_since_service(machine.last_serviced, now);
        AdvisoryContext {
            machine,
            days_since_service: days,
            next_task_date,
            profile: machine_profile(&machine.name),
            commentary: frequency_commentary(&machine.usage_frequency, days),
        }
    }

    /// Fills template `index` (`0..TEMPLATES.len()`).
    pub fn render(&self, index: usize) -> String {
        let days = self.days_since_service.to_string();
        let next_date = encode_date(self.next_task_date);
        let p = self.profile;
        let c = &self.commentary;
        let values: [(&str, &str); 15] = [
            ("machine", self.machine.name.as_str()),
            ("days", days.as_str()),
            ("next_date", next_date.as_str()),
            ("frequency", self.machine.usage_frequency.as_str()),
            ("primary", p.primary),
            ("consequence", p.consequence),
            ("components", p.components),
            ("cost_impact", p.cost_impact),
            ("vibration", p.vibration),
            ("wear", p.wear),
            ("failures", p.failures),
            ("efficiency", p.efficiency),
            ("issue", c.issue.as_str()),
            ("production", c.production),
            ("recommendation", c.recommendation),
        ];
        interpolate(TEMPLATES[index], &values)
    }

    /// All five renderings, in template order.
    pub fn render_all(&self) -> Vec<String> {
        (0..TEMPLATES.len()).map(|i| self.render(i)).collect()
    }
}

/// Picks a template and fills it in.
pub fn compose(ctx: &AdvisoryContext<'_>, picker: &mut dyn TemplatePicker) -> String {
    let index = picker.pick(TEMPLATES.len()).min(TEMPLATES.len() - 1);
    ctx.render(index)
}

// Single pass so substituted values are never rescanned for placeholders.
fn interpolate(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, v)) => out.push_str(v),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_leaves_braces_in_values_alone() {
        let out = interpolate("{a} and {b}", &[("a", "{b}"), ("b", "x")]);
        assert_eq!(out, "{b} and x");
    }

    #[test]
    fn interpolate_keeps_unknown_placeholders() {
        assert_eq!(interpolate("{nope}!", &[]), "{nope}!");
    }
}
