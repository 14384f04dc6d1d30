use typeahead::ui::tui::footer_legend;

#[test]
fn footer_legend_toggles_help() {
    let hidden = footer_legend(false);
    assert!(hidden.contains("F1 help"), "short footer should offer F1 help");
    assert!(hidden.contains("Enter choose"));
    assert!(hidden.contains("F10/Ctrl+C quit"));

    let shown = footer_legend(true);
    assert!(shown.contains("↑/↓ move"));
    assert!(shown.contains("Ctrl+U clear"));
    assert!(shown.contains("Tab switch pane"));
    assert!(shown.contains("F1 hide help"));
}
