use docauto_cst::{CstParser, Edit, UnitKind};

const SAMPLE: &str = r#"import math


def area(radius):
    return math.pi * radius ** 2


class Shape:
    """Base class for shapes."""

    def __init__(self, name):
        self.name = name

    def describe(self):
        return f"{self.name}"


def main():
    print(area(2))
"#;

#[test]
fn test_parses_realistic_module() {
    let mut parser = CstParser::new().expect("Failed to create parser");
    let module = parser.parse(SAMPLE).expect("Sample should parse");

    let units = module.units();
    let names: Vec<&str> = units.iter().map(|u| u.qualified_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "area",
            "Shape",
            "Shape.__init__",
            "Shape.describe",
            "main"
        ]
    );
}

#[test]
fn test_unit_metadata() {
    let mut parser = CstParser::new().unwrap();
    let module = parser.parse(SAMPLE).unwrap();
    let units = module.units();

    let shape = &units[1];
    assert_eq!(shape.kind, UnitKind::Class);
    assert!(shape.docstring.is_some());

    let describe = &units[3];
    assert_eq!(describe.kind, UnitKind::Function);
    assert_eq!(describe.class_context.as_deref(), Some("Shape"));
    assert!(describe.docstring.is_none());
    assert!(describe.source_text.starts_with("def describe"));
}

#[test]
fn test_roundtrip_edit_keeps_rest_of_file() {
    let mut parser = CstParser::new().unwrap();
    let module = parser.parse(SAMPLE).unwrap();
    let units = module.units();

    let area = units.iter().find(|u| u.name == "area").unwrap();
    let edit = Edit::insert_docstring(area, "Compute the area of a circle.").unwrap();
    let rewritten = module.apply(&[edit]).unwrap();

    assert!(rewritten.contains("def area(radius):\n    \"\"\"Compute the area of a circle.\"\"\"\n    return math.pi"));
    // Everything else is untouched
    assert!(rewritten.contains("class Shape:\n    \"\"\"Base class for shapes.\"\"\""));
    assert!(rewritten.ends_with("def main():\n    print(area(2))\n"));
}

#[test]
fn test_rewritten_source_still_parses() {
    let mut parser = CstParser::new().unwrap();
    let module = parser.parse(SAMPLE).unwrap();
    let units = module.units();

    let edits: Vec<Edit> = units
        .iter()
        .filter(|u| u.docstring.is_none())
        .map(|u| Edit::insert_docstring(u, "Generated.").unwrap())
        .collect();

    let rewritten = module.apply(&edits).unwrap();
    let reparsed = parser.parse(&rewritten).expect("rewritten source must stay valid");

    for unit in reparsed.units() {
        assert!(
            unit.docstring.is_some(),
            "{} should have a docstring after the run",
            unit.qualified_name
        );
    }
}
