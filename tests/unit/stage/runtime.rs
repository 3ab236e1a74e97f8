use std::io::Cursor;

use super::*;
use crate::{
    assets::source::MemorySource, config::reel::SequenceSpec, foundation::core::Viewport,
    host::document::HeadlessDocument,
};

fn png(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(16, 9, image::Rgba([shade, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn config(frame_count: u32) -> ReelConfig {
    ReelConfig {
        sequence: SequenceSpec {
            frame_count,
            ..SequenceSpec::default()
        },
        ..ReelConfig::default()
    }
}

fn source(cfg: &ReelConfig) -> Arc<MemorySource> {
    let mut src = MemorySource::new();
    for i in cfg.sequence.indices() {
        src.insert(&cfg.sequence.frame_path(i), png(i.0 as u8 * 20))
            .unwrap();
    }
    Arc::new(src)
}

fn mounted(frame_count: u32) -> Stage<HeadlessDocument> {
    let cfg = config(frame_count);
    let doc = HeadlessDocument::for_config(&cfg, Viewport::new(32, 20), 120.0);
    let src = source(&cfg);
    Stage::mount(cfg, doc, src).unwrap()
}

#[test]
fn mount_fails_fast_on_missing_elements() {
    let cfg = config(3);
    let doc = HeadlessDocument::new(Viewport::new(32, 20))
        .with_element("hero-canvas")
        .with_scroll_container("scroll-container", 100.0);
    let src = source(&cfg);
    let err = Stage::mount(cfg, doc, src).err().unwrap();
    assert!(matches!(err, ReelError::MissingElement(id) if id == "section-1"));
}

#[test]
fn mount_sizes_canvas_to_viewport_and_defers_first_frame() {
    let stage = mounted(3);
    assert_eq!(stage.renderer().canvas().width, 32);
    assert_eq!(stage.renderer().canvas().height, 20);
    assert_eq!(stage.renderer().awaiting(), Some(FrameIndex(0)));
    assert_eq!(stage.stats().deferred, 1);
}

#[test]
fn first_frame_draws_once_loaded() {
    let mut stage = mounted(3);
    let out = stage.wait_for_frames().unwrap();
    assert!(matches!(out, Some(DrawOutcome::Drawn(_))));
    assert_eq!(stage.stats().draws, 1);
    assert_eq!(stage.store().ready_count(), 3);
}

#[test]
fn scroll_schedules_redraw_for_next_tick() {
    let mut stage = mounted(3);
    stage.wait_for_frames().unwrap();

    // max scroll = 120 - 20 = 100
    stage.document_mut().set_scroll_top(100.0);
    let update = stage.on_scroll().unwrap();
    assert_eq!(update.frame, FrameIndex(2));
    assert!(update.frame_changed);
    assert_eq!(stage.pending_redraw(), Some(FrameIndex(2)));
    assert_eq!(stage.stats().draws, 1);

    let out = stage.on_animation_frame().unwrap();
    assert!(matches!(out, Some(DrawOutcome::Drawn(_))));
    assert_eq!(stage.stats().draws, 2);
    assert_eq!(stage.on_animation_frame().unwrap(), None);
}

#[test]
fn identical_scroll_positions_do_not_redraw() {
    let mut stage = mounted(3);
    stage.wait_for_frames().unwrap();

    stage.document_mut().set_scroll_top(50.0);
    stage.on_scroll().unwrap();
    stage.on_animation_frame().unwrap();
    let draws = stage.stats().draws;

    for _ in 0..5 {
        let update = stage.on_scroll().unwrap();
        assert!(!update.frame_changed);
        assert_eq!(stage.on_animation_frame().unwrap(), None);
    }
    assert_eq!(stage.stats().draws, draws);
}

#[test]
fn overlays_update_even_without_frame_change() {
    let mut stage = mounted(3);
    stage.document_mut().set_scroll_top(10.0);
    let update = stage.on_scroll().unwrap();
    assert_eq!(update.frame, FrameIndex(1));

    let s1 = stage.document().style("section-1").unwrap();
    assert!((s1.opacity - 0.5).abs() < 1e-9);
    assert!((s1.translate_y_px + 10.0).abs() < 1e-9);
    assert!(stage.document().style("section-2").is_some());
    assert!(stage.document().style("section-3").is_some());
}

#[test]
fn resize_redraws_current_frame() {
    let mut stage = mounted(3);
    stage.wait_for_frames().unwrap();

    stage.document_mut().set_viewport(Viewport::new(64, 64));
    let out = stage.on_resize().unwrap();
    assert!(matches!(out, DrawOutcome::Drawn(_)));
    let snap = stage.snapshot();
    assert_eq!((snap.width, snap.height), (64, 64));
}

#[test]
fn resize_before_loads_are_applied_defers_the_displayed_frame() {
    let mut stage = mounted(3);
    stage.document_mut().set_viewport(Viewport::new(40, 40));
    // Worker results are only applied by pump_loads / wait_for_frames.
    assert_eq!(stage.on_resize().unwrap(), DrawOutcome::Deferred);
    assert_eq!(stage.renderer().awaiting(), Some(FrameIndex(0)));

    let out = stage.wait_for_frames().unwrap();
    assert!(matches!(out, Some(DrawOutcome::Drawn(_))));
    assert_eq!(stage.snapshot().width, 40);
}

#[test]
fn oversized_frame_is_skipped_without_stopping_the_stage() {
    let cfg = config(1);
    let img = image::RgbaImage::from_pixel(70_000, 1, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    let mut src = MemorySource::new();
    src.insert(&cfg.sequence.frame_path(FrameIndex(0)), buf)
        .unwrap();

    let doc = HeadlessDocument::for_config(&cfg, Viewport::new(32, 20), 120.0);
    let mut stage = Stage::mount(cfg, doc, Arc::new(src)).unwrap();
    assert_eq!(
        stage.wait_for_frames().unwrap(),
        Some(DrawOutcome::Skipped)
    );
    assert_eq!(stage.on_resize().unwrap(), DrawOutcome::Skipped);
    assert_eq!(stage.stats().draws, 0);
}
