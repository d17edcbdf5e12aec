//! Step-by-step procedures for the standard maintenance tasks.

use crate::models::{GeneratedSchedule, MaintenanceTask};

/// A detailed procedure for one maintenance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checklist {
    pub title: &'static str,
    pub steps: &'static [&'static str],
    pub safety_notes: &'static str,
    pub estimated_time: &'static str,
    pub tools: &'static str,
}

/// Checklists keyed by task name.
pub static CHECKLISTS: &[(&str, Checklist)] = &[
    (
        "Check oil levels",
        Checklist {
            title: "Oil Level Inspection & Maintenance",
            steps: &[
                "Power down machine and wait 15 minutes for oil to settle",
                "Check oil viscosity using viscometer (target: SAE 10W-30)",
                "Inspect oil color - should be amber/black, not milky or metallic",
                "Measure oil level using dipstick - maintain between MIN/MAX marks",
                "Check for metal particles using magnetic drain plug inspection",
                "Test oil temperature resistance (operating range: -20°C to 120°C)",
                "Document oil level, viscosity readings, and any contamination found",
                "Top up with manufacturer-specified oil grade if below minimum",
            ],
            safety_notes: "Wear safety gloves and eye protection. Ensure proper ventilation.",
            estimated_time: "25-30 minutes",
            tools: "Dipstick, viscometer, funnel, oil sampling kit, safety equipment",
        },
    ),
    (
        "Inspect belts",
        Checklist {
            title: "Drive Belt Inspection & Tensioning",
            steps: &[
                "Power off machine and engage lockout/tagout procedures",
                "Visually inspect belt for cracks, fraying, or glazing on surface",
                "Check belt alignment using laser alignment tool or straight edge",
                "Measure belt tension using tension gauge (target: 140-160 Hz frequency)",
                "Inspect pulley grooves for wear, debris, or damage",
                "Check belt width consistency - should not vary more than 1mm",
                "Test belt flexibility - should bend without cracking",
                "Adjust tensioners to manufacturer specifications if needed",
                "Apply belt dressing if authorized by manufacturer",
            ],
            safety_notes: "Never attempt belt inspection while machine is running. Use proper lockout procedures.",
            estimated_time: "35-45 minutes",
            tools: "Belt tension gauge, laser alignment tool, straight edge, lockout kit",
        },
    ),
    (
        "Clean filters",
        Checklist {
            title: "Air & Oil Filter Maintenance",
            steps: &[
                "Shut down system and depressurize all air lines",
                "Remove air filter housing cover using appropriate tools",
                "Inspect filter element for dirt loading - replace if >80% clogged",
                "Clean reusable filters with compressed air (max 30 PSI)",
                "Check filter housing gaskets and seals for integrity",
                "Measure pressure differential across filter (max 2.5 PSI drop)",
                "Install new filter with proper orientation (airflow direction)",
                "Apply thin layer of filter oil to foam pre-filters if equipped",
                "Reassemble housing ensuring proper gasket placement",
                "Test system pressure and check for air leaks",
            ],
            safety_notes: "Wear dust mask when handling dirty filters. Dispose of filters per environmental regulations.",
            estimated_time: "20-25 minutes",
            tools: "Filter wrenches, compressed air gun, pressure gauge, replacement filters",
        },
    ),
];

pub fn checklist_for(task_name: &str) -> Option<&'static Checklist> {
    CHECKLISTS
        .iter()
        .find(|(name, _)| *name == task_name)
        .map(|(_, checklist)| checklist)
}

/// Checklists for the schedule's tasks, in task order. Tasks without one are skipped.
pub fn checklists_for(schedule: &GeneratedSchedule) -> Vec<(&MaintenanceTask, &'static Checklist)> {
    schedule
        .tasks
        .iter()
        .filter_map(|task| checklist_for(&task.name).map(|c| (task, c)))
        .collect()
}
