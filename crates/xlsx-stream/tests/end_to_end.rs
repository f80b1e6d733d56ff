use std::io::{Cursor, Read};

use pretty_assertions::assert_eq;
use xlsx_stream::{CellValue, HeaderOptions, NumberFormatKind, Workbook};

fn read_part(bytes: &[u8], name: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut out = String::new();
    archive.by_name(name)?.read_to_string(&mut out)?;
    Ok(out)
}

fn sales_workbook() -> Result<Workbook, Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new()?;
    workbook.write_sheet_header(
        "People",
        &[("name", "string"), ("count", "integer")],
        &HeaderOptions::default(),
    )?;
    workbook.write_sheet_row("People", &["Alice".into(), "5".into()])?;
    workbook.write_sheet_row("People", &["Bob".into(), "12".into()])?;
    Ok(workbook)
}

#[test]
fn typed_sheet_round_trips_through_the_package() -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = sales_workbook()?;
    assert_eq!(workbook.count_sheet_rows(Some("People")), 3);
    let sheet = workbook.sheet("People").ok_or("sheet missing")?;
    let kinds: Vec<_> = sheet.columns().iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![NumberFormatKind::String, NumberFormatKind::Numeric]);

    let bytes = workbook.write_to_vec()?;
    let xml = read_part(&bytes, "xl/worksheets/sheet1.xml")?;
    let doc = roxmltree::Document::parse(&xml)?;

    let dimension = doc
        .descendants()
        .find(|n| n.has_tag_name("dimension"))
        .ok_or("dimension missing")?;
    assert_eq!(dimension.attribute("ref"), Some("A1:B3"));

    let cells: Vec<(String, Option<String>, String)> = doc
        .descendants()
        .filter(|n| n.has_tag_name("c"))
        .map(|c| {
            let text = c
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect::<String>();
            (
                c.attribute("r").unwrap_or_default().to_string(),
                c.attribute("t").map(str::to_string),
                text,
            )
        })
        .collect();
    let inline = Some("inlineStr".to_string());
    let number = Some("n".to_string());
    assert_eq!(
        cells,
        vec![
            ("A1".to_string(), inline.clone(), "name".to_string()),
            ("B1".to_string(), inline.clone(), "count".to_string()),
            ("A2".to_string(), inline.clone(), "Alice".to_string()),
            ("B2".to_string(), number.clone(), "5".to_string()),
            ("A3".to_string(), inline, "Bob".to_string()),
            ("B3".to_string(), number, "12".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn package_contains_every_part() -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = sales_workbook()?;
    workbook.write_sheet_row("Second/Sheet", &["x".into()])?;
    let bytes = workbook.write_to_vec()?;

    let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice()))?;
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/app.xml",
            "docProps/core.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/workbook.xml",
            "xl/worksheets/sheet1.xml",
            "xl/worksheets/sheet2.xml",
        ]
    );

    let workbook_xml = read_part(&bytes, "xl/workbook.xml")?;
    let doc = roxmltree::Document::parse(&workbook_xml)?;
    let sheet_names: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("sheet"))
        .filter_map(|n| n.attribute("name"))
        .collect();
    assert_eq!(sheet_names, vec!["People", "Second Sheet"]);

    let second = read_part(&bytes, "xl/worksheets/sheet2.xml")?;
    assert!(
        second.contains(r#"<sheetView tabSelected="false" workbookViewId="0">"#),
        "only the first sheet is selected, got: {second}"
    );
    Ok(())
}

#[test]
fn formulas_dates_and_booleans_are_encoded() -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new()?;
    workbook.write_sheet_header(
        "Mixed",
        &[("f", "GENERAL"), ("d", "date"), ("dt", "datetime"), ("b", "GENERAL")],
        &HeaderOptions::default().suppress_row(true),
    )?;
    workbook.write_sheet_row(
        "Mixed",
        &[
            "=SUM(A1:A2)".into(),
            "2013-05-17".into(),
            "2000-01-01 18:00:00".into(),
            CellValue::Boolean(true),
        ],
    )?;
    let bytes = workbook.write_to_vec()?;
    let xml = read_part(&bytes, "xl/worksheets/sheet1.xml")?;

    assert!(xml.contains(r#"<c r="A1" s="1" t="s"><f>=SUM(A1:A2)</f></c>"#), "{xml}");
    assert!(xml.contains(r#"<c r="B1" s="2" t="n"><v>41411</v></c>"#), "{xml}");
    assert!(xml.contains(r#"<c r="C1" s="3" t="n"><v>36526.75</v></c>"#), "{xml}");
    assert!(xml.contains(r#"<c r="D1" s="1" t="b"><v>1</v></c>"#), "{xml}");
    assert!(xml.contains(r#"<dimension ref="A1:D1"/>"#), "{xml}");
    Ok(())
}

#[test]
fn merge_ranges_and_widening_survive_packaging() -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new()?;
    workbook.write_sheet_header(
        "Wide",
        &[("a", "string"), ("b", "string")],
        &HeaderOptions::default(),
    )?;
    workbook.write_sheet_row("Wide", &["1".into(), "2".into(), "3".into(), "4".into()])?;
    workbook.write_sheet_row("Wide", &["x".into()])?;
    workbook.mark_merged_cell("Wide", 0, 0, 0, 1)?;

    let sheet = workbook.sheet("Wide").ok_or("sheet missing")?;
    assert_eq!(sheet.columns().len(), 4);

    let bytes = workbook.write_to_vec()?;
    let xml = read_part(&bytes, "xl/worksheets/sheet1.xml")?;
    let doc = roxmltree::Document::parse(&xml)?;
    let merges: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("mergeCell"))
        .filter_map(|n| n.attribute("ref"))
        .collect();
    assert_eq!(merges, vec!["A1:B1"]);
    assert!(xml.contains(r#"<dimension ref="A1:D3"/>"#), "{xml}");
    // Widened columns are GENERAL: "3" is auto-detected as a number.
    assert!(xml.contains(r#"<c r="C2" s="2" t="n"><v>3</v></c>"#), "{xml}");
    assert!(xml.contains(r#"<c r="A2" s="1" t="inlineStr"><is><t>1</t></is></c>"#), "{xml}");

    // Finalized by the package write: later merges are ignored.
    workbook.mark_merged_cell("Wide", 5, 5, 6, 6)?;
    assert_eq!(workbook.sheet("Wide").map(|s| s.merge_cells().len()), Some(1));
    Ok(())
}

#[test]
fn colliding_tab_names_are_made_unique() -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new()?;
    workbook.write_sheet_row("a/b", &["x".into()])?;
    workbook.write_sheet_row("a b", &["y".into()])?;
    let bytes = workbook.write_to_vec()?;

    let workbook_xml = read_part(&bytes, "xl/workbook.xml")?;
    let doc = roxmltree::Document::parse(&workbook_xml)?;
    let sheet_names: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("sheet"))
        .filter_map(|n| n.attribute("name"))
        .collect();
    assert_eq!(sheet_names, vec!["a b", "a b (2)"]);
    Ok(())
}

#[test]
fn write_sheet_finalizes_in_one_call() -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new()?;
    workbook.write_sheet(
        &[
            vec![CellValue::from("a"), CellValue::Integer(1)],
            vec![CellValue::from("b"), CellValue::Integer(2)],
        ],
        "",
        &[("letter", "string"), ("n", "integer")],
    )?;
    assert_eq!(workbook.count_sheet_rows(None), 3);
    workbook.write_sheet_row("Sheet1", &["late".into()])?;
    assert_eq!(workbook.count_sheet_rows(Some("Sheet1")), 3);

    let bytes = workbook.write_to_vec()?;
    let xml = read_part(&bytes, "xl/worksheets/sheet1.xml")?;
    assert!(xml.contains(r#"<dimension ref="A1:B3"/>"#), "{xml}");
    assert!(!xml.contains("late"));
    Ok(())
}
