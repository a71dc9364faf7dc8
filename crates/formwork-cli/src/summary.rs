use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use formwork_cli::script::{CheckReport, ControlSummary, StepReport};

pub fn print_summary(report: &CheckReport) {
    if let Some(model) = &report.model {
        println!("Model: {model}");
    }
    print_step_table(&report.steps);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Control"),
        header_cell("Type"),
        header_cell("Primitive"),
        header_cell("Value"),
        header_cell("State"),
        header_cell("Messages"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Center);
    for control in &report.controls {
        table.add_row(vec![
            Cell::new(&control.name).add_attribute(Attribute::Bold),
            Cell::new(&control.controltype),
            dim_cell(&control.primitive),
            value_cell(control),
            state_cell(control),
            Cell::new(control.messages.join("\n")),
        ]);
    }
    println!("{table}");

    let status = if report.submitted.is_some() {
        Cell::new("submitted").fg(Color::Green)
    } else if report.disabled {
        Cell::new("disabled").fg(Color::Yellow)
    } else {
        Cell::new("ready").fg(Color::Green)
    };
    let mut footer = Table::new();
    apply_table_style(&mut footer);
    footer.add_row(vec![
        Cell::new("Form").add_attribute(Attribute::Bold),
        status.add_attribute(Attribute::Bold),
        count_cell(report.error_count(), Color::Red),
    ]);
    println!("{footer}");
}

fn print_step_table(steps: &[StepReport]) {
    if steps.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Action"),
        header_cell("Control"),
        header_cell("Outcome"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, step) in steps.iter().enumerate() {
        let outcome = match step.outcome.as_str() {
            "rejected" | "blocked" | "already submitted" => {
                Cell::new(&step.outcome).fg(Color::Yellow)
            }
            "submitted" => Cell::new(&step.outcome).fg(Color::Green),
            _ => dim_cell(&step.outcome),
        };
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(step.action),
            Cell::new(step.control.as_deref().unwrap_or("-")),
            outcome,
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::UpperBoundary(Width::Fixed(22)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Percentage(40)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(control: &ControlSummary) -> Cell {
    if control.value.is_absent() {
        return dim_cell("-");
    }
    if control.controltype.starts_with("password") {
        return dim_cell("••••");
    }
    Cell::new(control.value.render())
}

fn state_cell(control: &ControlSummary) -> Cell {
    if !control.edit {
        dim_cell("display")
    } else if control.flagged {
        Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold)
    } else if control.has_error {
        Cell::new("pending").fg(Color::Yellow)
    } else {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    let label = if count == 1 {
        "1 error".to_string()
    } else {
        format!("{count} errors")
    };
    if count > 0 {
        Cell::new(label).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(label)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
