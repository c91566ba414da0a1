#![deny(unused_must_use)]

use crate::cli::{Args, PointColorArg};
use crate::loader::LoadUpdate;
use anyhow::Result;
use cloud_render::renderer::backends::glium::GliumRenderOptions;
use cloud_render::renderer::settings::{
    BaseRenderSettings, Color, ColorMap, PointCloudRenderSettings, PointColor, PointShape,
    PointSize, RgbPointColoring, ScalarAttributeColoring,
};
use cloud_render::renderer::viewer::{
    MarkerId, PointCloudId, RenderThread, RenderThreadBuilderExt, Window,
};
use crossbeam_channel::{never, select};
use human_panic::setup_panic;
use log::{debug, error};
use nalgebra::Vector3;
use pasture_core::layout::attributes::{COLOR_RGB, INTENSITY};
use std::collections::HashMap;

mod cli;
mod loader;
mod poi;

#[paw::main]
fn main(args: Args) {
    // panic handler
    setup_panic!();

    // logger
    // unwrap: will only fail, if the logger is already initialized - which it clearly is not
    simple_logger::init_with_level(args.log_level).unwrap();

    let options = GliumRenderOptions {
        multisampling: args.multisampling,
    };
    options.run(move |render_thread| {
        if let Err(e) = run(&args, &render_thread) {
            error!("{:#}", e);
        }
        render_thread.terminate();
    });
}

fn run(args: &Args, render_thread: &RenderThread) -> Result<()> {
    let pois = match &args.pois {
        Some(path) => poi::load_pois(path)?,
        None => poi::default_pois(),
    };

    // create window
    let window = render_thread.open_window()?;
    window.set_render_settings(BaseRenderSettings {
        window_title: "POI Viewer".to_string(),
        ..Default::default()
    })?;

    // one marker per point of interest
    // (the default marker style matches what we want: small red spheres, with
    // the camera placed slightly above and behind the point when focused)
    let mut pois_by_marker = HashMap::new();
    for poi in pois {
        let marker_id = window.add_marker(poi.to_marker())?;
        pois_by_marker.insert(marker_id, poi);
    }
    let selections = window.subscribe_to_selection()?;

    // initial camera placement, looking at the origin
    window
        .camera_movement()
        .view_from_offset(Vector3::zeros(), Vector3::new(4.0, 2.0, 1.0))
        .execute()?;

    // start loading the model
    window.set_status_text(Some("Loading model: 0.0%".to_string()))?;
    let mut load_updates = loader::spawn(args.input.clone());

    // keep reacting to load progress and marker selections,
    // until the user closes the window
    let mut chunks: Vec<PointCloudId> = Vec::new();
    let mut applied_point_settings = false;
    loop {
        select! {
            recv(load_updates) -> update => match update {
                Ok(LoadUpdate::Progress { points, loaded, total, has_colors }) => {
                    if !applied_point_settings {
                        window.set_default_point_cloud_settings(
                            point_cloud_settings(args, has_colors),
                        )?;
                        applied_point_settings = true;
                    }
                    let id = window
                        .add_point_cloud_with_attributes(&points, &[&COLOR_RGB, &INTENSITY])?;
                    chunks.push(id);
                    let percent = 100.0 * loaded as f64 / total as f64;
                    window.set_status_text(Some(format!("Loading model: {:.1}%", percent)))?;
                }
                Ok(LoadUpdate::Done) => {
                    window.set_status_text(None)?;
                    load_updates = never();
                }
                Ok(LoadUpdate::Failed(e)) => {
                    error!("Error loading the model: {:#}", e);
                    // a failed load leaves no partial geometry behind
                    for id in chunks.drain(..) {
                        window.remove_point_cloud(id)?;
                    }
                    window.set_status_text(Some("Failed to load model.".to_string()))?;
                    load_updates = never();
                }
                Err(_) => {
                    load_updates = never();
                }
            },
            recv(selections) -> selection => match selection {
                Ok(marker_id) => {
                    if let Some(poi) = pois_by_marker.get(&marker_id) {
                        debug!("Selected point of interest: {}", poi.name);
                    }
                    focus_poi(&window, marker_id)?;
                }
                // the user closed the window
                Err(_) => break,
            },
        }
    }
    Ok(())
}

/// Flies the camera to the point of interest and shows its description in the
/// info panel.
fn focus_poi(window: &Window, marker_id: MarkerId) -> Result<()> {
    window
        .camera_movement()
        .focus_on_marker(marker_id)
        .execute()?;
    window.show_marker_info(marker_id)?;
    Ok(())
}

fn point_cloud_settings(args: &Args, has_colors: bool) -> PointCloudRenderSettings {
    let point_color = match args.point_color {
        PointColorArg::Auto => {
            if has_colors {
                PointColor::Rgb(RgbPointColoring {
                    attribute: COLOR_RGB,
                })
            } else {
                PointColor::Fixed(Color::WHITE)
            }
        }
        PointColorArg::Fixed => PointColor::Fixed(Color::WHITE),
        PointColorArg::Rgb => PointColor::Rgb(RgbPointColoring {
            attribute: COLOR_RGB,
        }),
        PointColorArg::Intensity => PointColor::ScalarAttribute(ScalarAttributeColoring {
            attribute: INTENSITY,
            color_map: ColorMap::fire(),
            min: 0.0,
            max: u16::MAX as f32,
        }),
    };
    PointCloudRenderSettings {
        point_color,
        point_shape: PointShape::Round,
        point_size: PointSize::Fixed(args.point_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structopt::StructOpt;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["poi-viewer"];
        full.extend_from_slice(argv);
        Args::from_iter(full)
    }

    #[test]
    fn auto_coloring_uses_the_file_colors_if_present() {
        let settings = point_cloud_settings(&args(&[]), true);
        assert!(matches!(settings.point_color, PointColor::Rgb(_)));
    }

    #[test]
    fn auto_coloring_falls_back_to_a_fixed_color() {
        let settings = point_cloud_settings(&args(&[]), false);
        assert!(matches!(
            settings.point_color,
            PointColor::Fixed(Color::WHITE)
        ));
    }

    #[test]
    fn explicit_coloring_ignores_the_file_colors() {
        let settings = point_cloud_settings(&args(&["--point-color", "fixed"]), true);
        assert!(matches!(settings.point_color, PointColor::Fixed(_)));

        let settings = point_cloud_settings(&args(&["--point-color", "intensity"]), false);
        assert!(matches!(
            settings.point_color,
            PointColor::ScalarAttribute(_)
        ));
    }

    #[test]
    fn the_point_size_argument_is_used() {
        let settings = point_cloud_settings(&args(&["--point-size", "7.5"]), false);
        assert!(matches!(settings.point_size, PointSize::Fixed(size) if size == 7.5));
    }
}
