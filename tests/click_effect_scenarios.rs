use click_effects::{ClickEffects, Effect, Error, Harness};

#[test]
fn ordered_list_item_gets_line_through_on_click() -> click_effects::Result<()> {
    let mut harness = Harness::from_html(r#"<ol><li id="a">x</li></ol>"#)?;
    let _ = ClickEffects::install(&mut harness);

    harness.click("#a")?;
    harness.assert_style("#a", "text-decoration", "line-through")?;
    Ok(())
}

#[test]
fn unordered_list_item_becomes_transparent_on_click() -> click_effects::Result<()> {
    let mut harness = Harness::from_html(r#"<ul><li id="b">y</li></ul>"#)?;
    let _ = ClickEffects::install(&mut harness);

    harness.click("#b")?;
    harness.assert_style("#b", "opacity", "0")?;
    Ok(())
}

#[test]
fn row_image_collapses_on_click() -> click_effects::Result<()> {
    let mut harness = Harness::from_html(r#"<div id="row"><img id="c"></div>"#)?;
    let _ = ClickEffects::install(&mut harness);

    harness.click("#c")?;
    harness.assert_style("#c", "width", "0px")?;
    Ok(())
}

#[test]
fn destroy_all_button_mutates_every_collection_at_once() -> click_effects::Result<()> {
    let html = r#"
    <ol><li id="a">x</li></ol>
    <ul><li id="b">y</li></ul>
    <div id="row"><img id="c"></div>
    <button id="destroy-all">METEOR ME</button>
    "#;
    let mut harness = Harness::from_html(html)?;
    ClickEffects::install(&mut harness)?;
    harness.enable_trace(true);
    harness.set_trace_stderr(false);

    harness.click("#destroy-all")?;

    harness.assert_style("#a", "text-decoration", "line-through")?;
    harness.assert_style("#b", "opacity", "0")?;
    harness.assert_style("#c", "width", "0px")?;

    let logs = harness.take_trace_logs();
    let clicked = logs
        .iter()
        .filter(|line| line.starts_with("[event] click"))
        .collect::<Vec<_>>();
    assert_eq!(clicked.len(), 1, "only the button should see a click: {logs:?}");
    assert!(clicked[0].contains("target=#destroy-all"));
    Ok(())
}

#[test]
fn mass_effect_order_follows_collection_order() -> click_effects::Result<()> {
    let html = r#"
    <div id="row"><img id="c"></div>
    <ul><li id="b">y</li></ul>
    <ol><li id="a">x</li></ol>
    <button id="destroy-all">go</button>
    "#;
    let mut harness = Harness::from_html(html)?;
    let effects = ClickEffects::install(&mut harness)?;
    harness.enable_trace(true);
    harness.set_trace_stderr(false);
    harness.set_trace_events(false);

    effects.apply_all(&mut harness)?;

    let order = harness
        .take_trace_logs()
        .into_iter()
        .filter(|line| line.starts_with("[effect]") && !line.contains("apply-all"))
        .collect::<Vec<_>>();
    assert_eq!(order.len(), 3);
    assert!(order[0].contains("#a"));
    assert!(order[1].contains("#b"));
    assert!(order[2].contains("#c"));
    Ok(())
}

#[test]
fn mass_effect_ignores_prior_click_history() -> click_effects::Result<()> {
    let html = r#"
    <ol><li id="a1">x</li><li id="a2">x</li></ol>
    <ul><li id="b1">y</li></ul>
    <div id="row"><img id="c1"><img id="c2"></div>
    <button id="destroy-all">go</button>
    "#;
    let mut harness = Harness::from_html(html)?;
    ClickEffects::install(&mut harness)?;

    harness.click("#a2")?;
    harness.click("#c1")?;
    harness.click("#c1")?;
    harness.click("#destroy-all")?;

    for id in ["#a1", "#a2"] {
        harness.assert_style(id, "text-decoration", "line-through")?;
    }
    harness.assert_style("#b1", "opacity", "0")?;
    for id in ["#c1", "#c2"] {
        harness.assert_style(id, "width", "0px")?;
    }
    Ok(())
}

#[test]
fn empty_collections_do_not_break_install_or_mass_effect() -> click_effects::Result<()> {
    let html = r#"
    <ol><li id="a">x</li></ol>
    <button id="destroy-all">go</button>
    "#;
    let mut harness = Harness::from_html(html)?;
    let effects = ClickEffects::install(&mut harness)?;

    assert!(effects.collection(Effect::Fade).is_empty());
    assert!(effects.collection(Effect::Collapse).is_empty());

    harness.click("#destroy-all")?;
    harness.assert_style("#a", "text-decoration", "line-through")?;
    Ok(())
}

#[test]
fn missing_button_only_aborts_the_mass_wiring() -> click_effects::Result<()> {
    let html = r#"
    <ol><li id="a">x</li></ol>
    <div id="row"><img id="c"></div>
    "#;
    let mut harness = Harness::from_html(html)?;

    let err = ClickEffects::install(&mut harness).expect_err("control is missing");
    assert_eq!(err, Error::SelectorNotFound("#destroy-all".into()));
    assert_eq!(
        err.to_string(),
        "selector not found: #destroy-all"
    );

    harness.click("#c")?;
    harness.assert_style("#c", "width", "0px")?;
    harness.assert_style("#a", "text-decoration", "")?;
    Ok(())
}

#[test]
fn clicking_text_outside_collections_changes_nothing() -> click_effects::Result<()> {
    let html = r#"
    <p id="intro">Click things</p>
    <ol><li id="a">x</li></ol>
    <button id="destroy-all">go</button>
    "#;
    let mut harness = Harness::from_html(html)?;
    ClickEffects::install(&mut harness)?;
    let before = harness.dump_dom("ol")?;

    harness.click("#intro")?;
    harness.click("ol")?;

    assert_eq!(harness.dump_dom("ol")?, before);
    Ok(())
}
