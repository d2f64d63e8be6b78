use click_effects::{ClickEffects, Effect, Harness, NodeId};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const EFFECT_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/click_effect_property_test.txt";
const DEFAULT_EFFECT_PROPTEST_CASES: u32 = 128;

#[derive(Clone, Debug)]
struct PageShape {
    ordered: usize,
    unordered: usize,
    images: usize,
}

#[derive(Clone, Debug)]
enum PageAction {
    ClickOrdered(usize),
    ClickUnordered(usize),
    ClickImage(usize),
    ClickControl,
    ApplyAll,
}

fn effect_proptest_cases() -> u32 {
    std::env::var("CLICK_EFFECTS_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_EFFECT_PROPTEST_CASES)
}

fn page_shape_strategy() -> BoxedStrategy<PageShape> {
    (0usize..=4, 0usize..=4, 0usize..=4)
        .prop_map(|(ordered, unordered, images)| PageShape {
            ordered,
            unordered,
            images,
        })
        .boxed()
}

fn page_action_strategy() -> BoxedStrategy<PageAction> {
    prop_oneof![
        3 => (0usize..4).prop_map(PageAction::ClickOrdered),
        3 => (0usize..4).prop_map(PageAction::ClickUnordered),
        3 => (0usize..4).prop_map(PageAction::ClickImage),
        1 => Just(PageAction::ClickControl),
        1 => Just(PageAction::ApplyAll),
    ]
    .boxed()
}

fn render_page(shape: &PageShape) -> String {
    let mut html = String::from("<main>\n<ol>\n");
    for idx in 0..shape.ordered {
        html.push_str(&format!("  <li id=\"o{idx}\">ordered {idx}</li>\n"));
    }
    html.push_str("</ol>\n<ul>\n");
    for idx in 0..shape.unordered {
        html.push_str(&format!("  <li id=\"u{idx}\">unordered {idx}</li>\n"));
    }
    html.push_str("</ul>\n<div id=\"row\">\n");
    for idx in 0..shape.images {
        html.push_str(&format!("  <img id=\"i{idx}\" src=\"{idx}.png\">\n"));
    }
    html.push_str("</div>\n<button id=\"destroy-all\">METEOR ME</button>\n</main>\n");
    html
}

fn fail(err: click_effects::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

/// Inline style of every collected element, in collection order.
fn style_snapshot(harness: &Harness, effects: &ClickEffects) -> Result<Vec<String>, TestCaseError> {
    let mut out = Vec::new();
    for collection in effects.collections() {
        for node in collection.members() {
            for effect in Effect::ALL {
                out.push(harness.node_style(*node, effect.property()).map_err(fail)?);
            }
        }
    }
    Ok(out)
}

fn click_member(
    harness: &mut Harness,
    effects: &ClickEffects,
    effect: Effect,
    idx: usize,
) -> Result<Option<NodeId>, TestCaseError> {
    let Some(node) = effects.collection(effect).members().get(idx).copied() else {
        return Ok(None);
    };
    harness.click_node(node).map_err(fail)?;
    Ok(Some(node))
}

fn assert_click_touches_only_target(shape: &PageShape, actions: &[PageAction]) -> TestCaseResult {
    let mut harness = Harness::from_html(&render_page(shape)).map_err(fail)?;
    let effects = ClickEffects::install(&mut harness).map_err(fail)?;

    for (step, action) in actions.iter().enumerate() {
        let before = style_snapshot(&harness, &effects)?;
        let clicked = match action {
            PageAction::ClickOrdered(idx) => {
                click_member(&mut harness, &effects, Effect::StrikeThrough, *idx)?
                    .map(|node| (node, Effect::StrikeThrough))
            }
            PageAction::ClickUnordered(idx) => {
                click_member(&mut harness, &effects, Effect::Fade, *idx)?
                    .map(|node| (node, Effect::Fade))
            }
            PageAction::ClickImage(idx) => click_member(&mut harness, &effects, Effect::Collapse, *idx)?
                .map(|node| (node, Effect::Collapse)),
            PageAction::ClickControl => {
                harness.click("#destroy-all").map_err(fail)?;
                None
            }
            PageAction::ApplyAll => {
                effects.apply_all(&mut harness).map_err(fail)?;
                None
            }
        };

        let Some((node, effect)) = clicked else {
            continue;
        };
        prop_assert_eq!(
            harness.node_style(node, effect.property()).map_err(fail)?,
            effect.value()
        );

        let after = style_snapshot(&harness, &effects)?;
        let mut idx = 0usize;
        for collection in effects.collections() {
            for member in collection.members() {
                for checked in Effect::ALL {
                    if !(*member == node && checked == effect) {
                        prop_assert_eq!(
                            &before[idx],
                            &after[idx],
                            "step {} {:?} changed an unrelated style",
                            step,
                            action
                        );
                    }
                    idx += 1;
                }
            }
        }
    }

    Ok(())
}

fn assert_mass_effect_is_idempotent(shape: &PageShape, actions: &[PageAction]) -> TestCaseResult {
    let mut harness = Harness::from_html(&render_page(shape)).map_err(fail)?;
    let effects = ClickEffects::install(&mut harness).map_err(fail)?;

    for action in actions {
        match action {
            PageAction::ClickOrdered(idx) => {
                click_member(&mut harness, &effects, Effect::StrikeThrough, *idx)?;
            }
            PageAction::ClickUnordered(idx) => {
                click_member(&mut harness, &effects, Effect::Fade, *idx)?;
            }
            PageAction::ClickImage(idx) => {
                click_member(&mut harness, &effects, Effect::Collapse, *idx)?;
            }
            PageAction::ClickControl | PageAction::ApplyAll => {}
        }
    }

    harness.click("#destroy-all").map_err(fail)?;
    let once = harness.dump_dom("main").map_err(fail)?;
    effects.apply_all(&mut harness).map_err(fail)?;
    let twice = harness.dump_dom("main").map_err(fail)?;
    prop_assert_eq!(&once, &twice);

    for collection in effects.collections() {
        let effect = collection.effect();
        for node in collection.members() {
            prop_assert_eq!(
                harness.node_style(*node, effect.property()).map_err(fail)?,
                effect.value()
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: effect_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(EFFECT_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn single_clicks_only_style_their_target(
        shape in page_shape_strategy(),
        actions in vec(page_action_strategy(), 1..=16),
    ) {
        assert_click_touches_only_target(&shape, &actions)?;
    }

    #[test]
    fn mass_effect_reaches_a_fixed_point(
        shape in page_shape_strategy(),
        actions in vec(page_action_strategy(), 0..=16),
    ) {
        assert_mass_effect_is_idempotent(&shape, &actions)?;
    }
}
