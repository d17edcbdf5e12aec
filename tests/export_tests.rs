use maintsched::advisory::FixedSequence;
use maintsched::export::document::{self, layout, DocumentRenderer, PageGeometry, TABLE_HEADERS, TITLE};
use maintsched::export::export_file_name;
use maintsched::export::json::{self, StructuredExport};
use maintsched::export::pdf::PdfRenderer;
use maintsched::generator::generate;
use maintsched::models::{MachineRecord, MaintenanceTask, Priority, TaskStatus, UsageFrequency};
use maintsched::session::ActiveSchedule;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use tempfile::tempdir;
use uuid::Uuid;

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap()
}

fn active(name: &str) -> ActiveSchedule {
    let machine = MachineRecord {
        name: name.to_string(),
        last_serviced: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        usage_frequency: UsageFrequency::Weekly,
    };
    let schedule = generate(&machine, generated_at(), &mut FixedSequence::new(vec![0]));
    ActiveSchedule {
        machine,
        schedule,
        generated_at: generated_at(),
    }
}

fn all_texts(doc: &document::Document) -> Vec<String> {
    doc.pages
        .iter()
        .flat_map(|p| p.texts().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

#[test]
fn test_export_file_names() {
    assert_eq!(export_file_name("CNC Mill 3", "json"), "CNC Mill 3-maintenance-schedule.json");
    assert_eq!(export_file_name("Line A/B", "pdf"), "Line A_B-maintenance-schedule.pdf");
    assert_eq!(export_file_name("", "json"), "-maintenance-schedule.json");
}

#[test]
fn test_json_export_round_trips() {
    let a = active("CNC Mill 3");
    let text = json::to_json(&a).unwrap();
    let parsed = json::parse(&text).unwrap();
    assert_eq!(parsed, StructuredExport::from_active(&a));
    assert_eq!(parsed.into_active().unwrap(), a);
}

#[test]
fn test_json_export_field_names() {
    let a = active("CNC Mill 3");
    let value: serde_json::Value = serde_json::from_str(&json::to_json(&a).unwrap()).unwrap();
    assert_eq!(value["machine"], "CNC Mill 3");
    assert_eq!(value["lastServiced"], "2024-01-01");
    assert_eq!(value["usageFrequency"], "weekly");
    assert_eq!(value["generatedOn"], "2024-01-05T09:30:00Z");
    assert_eq!(value["tasks"].as_array().unwrap().len(), 3);
    assert_eq!(value["tasks"][2]["dueDate"], "2024-01-22");
    assert_eq!(value["tasks"][0]["status"], "Scheduled");
    assert!(value["advisory"].as_str().unwrap().contains("CNC Mill 3"));
}

#[test]
fn test_json_import_rejects_bad_dates() {
    let mut export = StructuredExport::from_active(&active("Lathe"));
    export.tasks[1].due_date = "next tuesday".to_string();
    assert!(export.into_active().is_err());
    assert!(json::parse("{\"machine\": 3}").is_err());
}

#[test]
fn test_json_write_creates_named_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("reports");
    let path = json::write(&active("Pump 4"), &out).unwrap();
    assert_eq!(path, out.join("Pump 4-maintenance-schedule.json"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(json::parse(&text).unwrap().machine, "Pump 4");
}

#[test]
fn test_layout_sections_in_order() {
    let a = active("CNC Mill 3");
    let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
    let doc = layout(&a, PageGeometry::A4, now);
    assert_eq!(doc.pages.len(), 1);

    let texts = all_texts(&doc);
    let pos = |needle: &str| {
        texts
            .iter()
            .position(|t| t == needle)
            .unwrap_or_else(|| panic!("missing {:?} in {:?}", needle, texts))
    };
    assert!(pos(TITLE) < pos("Machine Information"));
    assert!(pos("Machine Information") < pos("Machine Name: CNC Mill 3"));
    assert!(pos("Usage Frequency: Weekly") < pos("Maintenance Recommendation"));
    assert!(pos("Maintenance Recommendation") < pos("Scheduled Maintenance Tasks"));
    assert!(pos("Scheduled Maintenance Tasks") < pos(TABLE_HEADERS[0]));
    assert!(pos("Check oil levels") < pos("Inspect belts"));
    assert!(pos("Inspect belts") < pos("Clean filters"));
    pos("Report Generated: 2024-01-05");
    pos("Generated by Maintenance Scheduler on 2024-01-10");

    // The first task fell due before the report date.
    assert!(texts.iter().any(|t| t == "Overdue"));
    assert_eq!(texts.iter().filter(|t| *t == "Scheduled").count(), 2);

    // Emoji are dropped from the advisory text.
    assert!(texts.iter().any(|t| t.starts_with("CRITICAL ALERT: CNC Mill 3")));
}

#[test]
fn test_layout_paginates_long_task_lists() {
    let mut a = active("Assembly Line");
    let start = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    a.schedule.tasks = (0..40)
        .map(|i| MaintenanceTask {
            id: Uuid::new_v4(),
            name: format!("Job {}", i),
            due_date: start + Duration::days(i),
            priority: Priority::Low,
            status: TaskStatus::Scheduled,
            description: String::new(),
        })
        .collect();

    let doc = layout(&a, PageGeometry::A4, generated_at());
    assert!(doc.pages.len() > 1);
    for page in &doc.pages {
        let texts: Vec<&str> = page.texts().collect();
        assert!(texts.contains(&TABLE_HEADERS[0]));
        assert!(texts.iter().any(|t| t.starts_with("Generated by Maintenance Scheduler on")));
    }
    let rows = all_texts(&doc).iter().filter(|t| t.starts_with("Job ")).count();
    assert_eq!(rows, 40);
}

#[test]
fn test_long_cells_are_truncated() {
    let mut a = active("Lathe");
    a.schedule.tasks[0].name = "Replace the entire hydraulic manifold assembly and flush lines".to_string();
    let doc = layout(&a, PageGeometry::A4, generated_at());
    let texts = all_texts(&doc);
    assert!(texts.iter().any(|t| t.starts_with("Replace the") && t.ends_with("...")));
}

#[test]
fn test_long_advisory_stays_above_the_footer() {
    let a = active(&"Lathe ".repeat(800));
    let doc = layout(&a, PageGeometry::A4, generated_at());
    let g = doc.geometry;

    let footer_y = g.height - 10.0;
    for page in &doc.pages {
        for element in &page.elements {
            if let document::Element::Text { y, text, .. } = element {
                assert!(*y <= footer_y, "{:?} drawn at {} past the page", text, y);
                if !text.starts_with("Generated by Maintenance Scheduler on") {
                    assert!(*y < g.height - 25.0, "{:?} drawn into the footer at {}", text, y);
                }
            }
            if let document::Element::Stroke { rect, color, .. } = element {
                if *color == document::Rgb::ACCENT {
                    assert!(rect.y + rect.h <= g.height - 25.0);
                }
            }
        }
    }

    let texts = all_texts(&doc);
    let start = texts.iter().position(|t| t == "Maintenance Recommendation").unwrap();
    let end = texts.iter().position(|t| t == "Scheduled Maintenance Tasks").unwrap();
    assert!(start < end);
    let advisory: Vec<&String> = texts[start + 1..end]
        .iter()
        .filter(|t| !t.starts_with("Generated by Maintenance Scheduler on"))
        .collect();
    assert!(advisory.last().unwrap().ends_with("..."));
    assert_eq!(advisory.iter().filter(|t| t.ends_with("...")).count(), 1);
    assert!(texts.iter().any(|t| t == "Check oil levels"));
}

#[test]
fn test_pdf_export_writes_a_pdf() {
    let dir = tempdir().unwrap();
    let a = active("CNC Mill 3");
    let path = document::write(&a, &PdfRenderer, dir.path(), generated_at()).unwrap();
    assert_eq!(path, dir.path().join("CNC Mill 3-maintenance-schedule.pdf"));

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.trim_end().ends_with("%%EOF"));
    assert!(text.contains("(MAINTENANCE SCHEDULER)"));
    assert!(text.contains("/Count 1"));
    assert_eq!(PdfRenderer.extension(), "pdf");
}

#[test]
fn test_export_into_unwritable_location_fails() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();
    assert!(json::write(&active("Lathe"), &blocker).is_err());
}
