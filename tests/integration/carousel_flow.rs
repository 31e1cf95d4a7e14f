//! Featured carousel driven end to end: catalog slides, config timing,
//! autoplay, rapid manual clicks and breakpoint changes.

use std::time::Duration;
use tokio::time::sleep;

use automation_hub::carousel::{Breakpoint, Carousel, CarouselHandle, Transition};
use automation_hub::catalog::WorkflowCatalog;
use automation_hub::config::AppConfig;

fn featured_handle(cfg: &AppConfig) -> CarouselHandle {
    let catalog = WorkflowCatalog::builtin().unwrap();
    let carousel = Carousel::new(catalog.featured(), cfg.carousel.visible_count).unwrap();
    CarouselHandle::spawn(carousel, cfg.carousel.timing().unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_visits_every_slide_and_wraps() {
    let cfg = AppConfig::default();
    let handle = featured_handle(&cfg);
    let n = handle.snapshot().slide_count;
    assert_eq!(n, 4);

    let mut seen = vec![handle.snapshot().active_slide];
    // Stay clear of the tick instants.
    sleep(Duration::from_millis(100)).await;
    for _ in 0..n {
        sleep(Duration::from_millis(cfg.carousel.autoplay_interval_ms)).await;
        seen.push(handle.snapshot().active_slide);
    }
    assert_eq!(seen, vec![0, 1, 2, 3, 0]);

    // The last step landed on a clone; the snap happens one transition later.
    sleep(Duration::from_millis(cfg.carousel.transition_ms + 10)).await;
    let snap = handle.snapshot();
    assert_eq!(snap.current_index, cfg.carousel.visible_count);
    assert_eq!(snap.transition, Transition::Instant);
    assert!(!snap.pending_correction);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_clicks_never_leave_buffer() {
    let cfg = AppConfig::default();
    let handle = featured_handle(&cfg);
    let k = cfg.carousel.visible_count;

    for _ in 0..11 {
        let snap = handle.next().await.unwrap();
        assert!(snap.current_index <= k + snap.slide_count);
    }
    for _ in 0..7 {
        let snap = handle.prev().await.unwrap();
        assert!(snap.current_index + 1 >= k);
    }

    sleep(Duration::from_millis(cfg.carousel.transition_ms + 1)).await;
    let snap = handle.snapshot();
    assert!(!snap.pending_correction);
    assert!(!snap.is_auto_playing);
    // 11 forward, 7 back: net +4 on 4 slides.
    assert_eq!(snap.active_slide, 0);
}

#[tokio::test(start_paused = true)]
async fn test_breakpoint_change_keeps_front_slide() {
    let cfg = AppConfig::default();
    let handle = featured_handle(&cfg);
    handle.go_to(2).await.unwrap();

    for width in [375, 800, 1440] {
        let visible = Breakpoint::from_width(width).visible_count();
        let snap = handle.set_visible_count(visible).await.unwrap();
        assert_eq!(snap.visible_count, visible);
        assert_eq!(snap.active_slide, 2);
        assert_eq!(snap.current_index, 2 + visible);
    }
}

#[tokio::test(start_paused = true)]
async fn test_handle_shutdown_stops_timers() {
    let cfg = AppConfig::default();
    let handle = featured_handle(&cfg);
    let mut rx = handle.subscribe();
    handle.shutdown().await;
    sleep(Duration::from_millis(10 * cfg.carousel.autoplay_interval_ms)).await;
    assert!(rx.changed().await.is_err());
}
