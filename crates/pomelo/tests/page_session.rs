//! Page-level defaults, coordinate resolution and gestures.

mod common;

use std::time::Duration;

use common::{locator, page, Gesture, MockDriver};

use pomelo::by::By;
use pomelo::config::PomeloConfig;
use pomelo::error::Error;
use pomelo::geometry::{Area, Coordinate, Offset, Point, Rect, Region, Stroke};
use pomelo::page::Page;

// ---------------------------------------------------------------------------
// 1. Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_page_defaults() {
    let driver = MockDriver::new();
    let page = Page::new(driver);

    assert_eq!(page.timeout(), Duration::from_secs(10));
    assert!(page.reraise());
    assert!(page.cache());
    assert_eq!(page.poll_interval(), Duration::from_millis(500));
    assert_eq!(page.remark(), "Page");
    assert_eq!(page.config(), PomeloConfig::default());
}

#[test]
fn test_with_config_applies_every_field() {
    let driver = MockDriver::new();
    let config = PomeloConfig {
        timeout_secs: 2.5,
        reraise: false,
        cache: false,
        poll_interval_ms: 100,
    };
    let page = Page::with_config(driver, config.clone()).unwrap();

    assert_eq!(page.timeout(), Duration::from_millis(2500));
    assert!(!page.reraise());
    assert!(!page.cache());
    assert_eq!(page.poll_interval(), Duration::from_millis(100));
    assert_eq!(page.config(), config);
}

#[test]
fn test_with_config_rejects_negative_timeout() {
    let driver = MockDriver::new();
    let config = PomeloConfig {
        timeout_secs: -1.0,
        ..PomeloConfig::default()
    };
    let err = Page::with_config(driver, config).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_wait_and_reraise_overrides() {
    let driver = MockDriver::new();
    let page = page(&driver).with_poll_interval(Duration::from_millis(250));

    let wait = page.wait(None);
    assert_eq!(wait.timeout(), Duration::from_secs(2));
    assert_eq!(wait.poll_interval(), Duration::from_millis(250));
    assert_eq!(page.wait(Some(Duration::ZERO)).timeout(), Duration::ZERO);

    assert!(page.timeout_reraise(None));
    assert!(!page.timeout_reraise(Some(false)));
}

#[test]
fn test_clones_share_identity() {
    let driver = MockDriver::new();
    let first = page(&driver);
    let second = page(&driver);

    assert_eq!(first.id(), first.clone().id());
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_factories_bind_to_page() {
    let driver = MockDriver::new();
    let page = page(&driver);

    let element = page.element(locator(By::Name, "q"));
    assert_eq!(element.page().id(), page.id());
    assert_eq!(element.timeout(), page.timeout());

    let elements = page.elements(locator(By::Name, "q"));
    assert_eq!(elements.page().id(), page.id());
}

// ---------------------------------------------------------------------------
// 2. Coordinates
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_relative_area_uses_window_rect() {
    let driver = MockDriver::new();
    driver.set_window(Rect::new(0.0, 0.0, 400.0, 800.0));
    let page = page(&driver);

    let area = page
        .resolve_area(Coordinate::relative(0.25, 0.5, 0.5, 0.25).unwrap())
        .await
        .unwrap();
    assert_eq!(area, Region::new(100, 400, 200, 200));
    assert_eq!(driver.window_calls(), 1);

    assert_eq!(page.resolve_area(Area::FULL).await.unwrap(), Region::new(0, 0, 400, 800));
}

#[tokio::test(start_paused = true)]
async fn test_absolute_area_is_returned_unchanged() {
    let driver = MockDriver::new();
    let page = page(&driver);

    let area = page
        .resolve_area(Coordinate::absolute(10, 20, 300, 400))
        .await
        .unwrap();
    assert_eq!(area, Region::new(10, 20, 300, 400));
    assert_eq!(driver.window_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_offsets_resolve_against_area() {
    let driver = MockDriver::new();
    let page = page(&driver);
    let area = Region::new(100, 200, 400, 600);

    assert_eq!(
        page.resolve_offset(Offset::UP, &area).unwrap(),
        Stroke::new(300, 650, 300, 350)
    );
    assert_eq!(
        page.resolve_offset(Offset::LOWER_RIGHT, &area).unwrap(),
        Stroke::new(200, 350, 400, 650)
    );
    // Absolute offsets ignore the area.
    assert_eq!(
        page.resolve_offset(Coordinate::absolute(1, 2, 3, 4), &area).unwrap(),
        Stroke::new(1, 2, 3, 4)
    );
}

#[test]
fn test_relative_components_must_be_fractions() {
    let err = Coordinate::relative(0.5, 1.5, 0.5, 0.25).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

// ---------------------------------------------------------------------------
// 3. Gestures
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_swipe_by_repeats() {
    let driver = MockDriver::new();
    let page = page(&driver);

    page.swipe_by(Offset::LEFT, Area::FULL, 300, 3).await.unwrap();
    assert_eq!(driver.gestures(), vec![Gesture::swipe(750, 500, 250, 500, 300); 3]);
}

#[tokio::test(start_paused = true)]
async fn test_flick_by_and_zero_times() {
    let driver = MockDriver::new();
    let page = page(&driver);

    page.flick_by(Offset::RIGHT, Area::FULL, 0).await.unwrap();
    assert!(driver.gestures().is_empty());

    page.flick_by(Offset::RIGHT, Area::FULL, 2).await.unwrap();
    assert_eq!(driver.gestures(), vec![Gesture::flick(250, 500, 750, 500); 2]);
}

#[tokio::test(start_paused = true)]
async fn test_tap_window_center() {
    let driver = MockDriver::new();
    let page = page(&driver);

    assert_eq!(page.window_center().await.unwrap(), Point::new(500, 500));
    page.tap_window_center(Some(50)).await.unwrap();
    page.tap(&[Point::new(1, 2), Point::new(3, 4)], None).await.unwrap();

    assert_eq!(
        driver.gestures(),
        vec![
            Gesture::Tap {
                points: vec![Point::new(500, 500)],
                duration_ms: Some(50),
            },
            Gesture::Tap {
                points: vec![Point::new(1, 2), Point::new(3, 4)],
                duration_ms: None,
            },
        ]
    );
}
