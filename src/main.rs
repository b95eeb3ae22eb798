use anyhow::Result;
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

use rusted_engine::engine::assets::AssetType;
use rusted_engine::engine::input::KeyCode;
use rusted_engine::engine::renderer::{TextureInfo, WgpuRenderer};
use rusted_engine::engine::scene::{
    Collider, Component, GameObject, GameObjectId, Script, ScriptContext, SpriteRenderer,
    Transform,
};
use rusted_engine::{Engine, EngineConfig, Vector2};

const CONFIG_PATH: &str = "config.json";
const DEMO_SCENE: &str = "demo.json";

/// Arrow keys / A-D to move, Space to jump, C to drop a crate, Q to quit
struct PlayerController {
    move_force: f32,
    jump_impulse: f32,
    crate_texture: TextureInfo,
}

impl Script for PlayerController {
    fn update(&mut self, ctx: &mut ScriptContext<'_>) -> rusted_engine::Result<()> {
        let axis = ctx.input.horizontal_axis();
        if axis != 0.0 {
            ctx.apply_force(Vector2::new(axis * self.move_force, 0.0))?;
        }

        let grounded = ctx
            .object
            .collider()
            .is_some_and(|c| !c.contacts().is_empty());
        if grounded && ctx.key_down(KeyCode::Space) {
            ctx.apply_impulse(Vector2::UP * self.jump_impulse)?;
        }

        if ctx.key_down(KeyCode::C) {
            let position = ctx
                .object
                .transform()
                .map_or(Vector2::ZERO, |t| t.position());
            let spawned = make_crate(position + Vector2::new(0.0, -160.0), self.crate_texture)?;
            ctx.commands.spawn(spawned);
        }
        if ctx.key_down(KeyCode::Q) {
            ctx.commands.quit();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "player"
    }
}

/// Joins the simulation when started and removes itself once it falls out
/// of the level
struct Falling;

impl Script for Falling {
    fn start(&mut self, ctx: &mut ScriptContext<'_>) -> rusted_engine::Result<()> {
        ctx.physics.add_game_object(ctx.object)
    }

    fn update(&mut self, ctx: &mut ScriptContext<'_>) -> rusted_engine::Result<()> {
        let fallen = ctx
            .object
            .transform()
            .is_some_and(|t| t.position().y > 4000.0);
        if fallen {
            let id = ctx.id();
            ctx.commands.destroy(id);
        }
        Ok(())
    }
}

/// Sensor pickup that disappears once anything enters it
struct Pickup;

impl Script for Pickup {
    fn update(&mut self, ctx: &mut ScriptContext<'_>) -> rusted_engine::Result<()> {
        let first_contact = ctx.contacts_began().next();
        if let Some(other) = first_contact {
            info!("{} picked up by {}", ctx.object.tag(), other);
            let id = ctx.id();
            ctx.commands.destroy(id);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "pickup"
    }
}

fn make_crate(position: Vector2, texture: TextureInfo) -> rusted_engine::Result<GameObject> {
    let mut sprite = SpriteRenderer::with_texture(texture);
    sprite.set_sprite_size(Vector2::new(48.0, 48.0));
    GameObject::new("crate")
        .with(Transform::at(position.x, position.y).with_size(48.0, 48.0))?
        .with(sprite)?
        .with(Collider::new())?
        .with(Component::script(Falling))
}

fn colored(engine: &mut Engine<WgpuRenderer>, id: GameObjectId, texture: TextureInfo) -> Result<()> {
    let object = engine.object_mut(id)?;
    let size = object.transform().map_or(Vector2::ONE, |t| t.size());
    if let Some(sprite) = object.sprite_renderer_mut() {
        sprite.set_sprite(texture);
        sprite.set_sprite_size(size);
    }
    Ok(())
}

/// Level built in code when no demo scene is on disk
fn build_demo_level(engine: &mut Engine<WgpuRenderer>) -> Result<GameObjectId> {
    let ground_tex = engine.color_texture("ground", [90, 70, 50, 255])?;
    let player_tex = engine.color_texture("player", [80, 160, 230, 255])?;
    let crate_tex = engine.color_texture("crate", [200, 150, 60, 255])?;
    let coin_tex = engine.color_texture("coin", [240, 210, 40, 255])?;

    let ground = engine.create_static_object(
        "ground",
        Vector2::new(640.0, 680.0),
        Vector2::new(1280.0, 64.0),
    )?;
    colored(engine, ground, ground_tex)?;

    for (x, y) in [(320.0, 520.0), (900.0, 440.0)] {
        let ledge = engine.create_static_object(
            "ledge",
            Vector2::new(x, y),
            Vector2::new(256.0, 32.0),
        )?;
        colored(engine, ledge, ground_tex)?;
    }

    let coin = engine.create_object("coin")?;
    {
        let object = engine.object_mut(coin)?;
        if let Some(transform) = object.transform_mut() {
            transform.set_position(Vector2::new(900.0, 380.0));
            transform.set_size(Vector2::new(24.0, 24.0));
        }
        if let Some(collider) = object.collider_mut() {
            collider.set_sensor(true);
        }
        object.add_component(Component::script(Pickup))?;
    }
    engine.add_tile(coin)?;
    colored(engine, coin, coin_tex)?;

    for i in 0..4 {
        let position = Vector2::new(520.0 + i as f32 * 60.0, 200.0 - i as f32 * 60.0);
        engine.spawn(make_crate(position, crate_tex)?)?;
    }

    let player = engine.create_object("player")?;
    {
        let object = engine.object_mut(player)?;
        if let Some(transform) = object.transform_mut() {
            transform.set_position(Vector2::new(200.0, 400.0));
            transform.set_size(Vector2::new(48.0, 64.0));
        }
        if let Some(collider) = object.collider_mut() {
            collider.set_friction(0.8);
        }
        object.add_component(Component::script(PlayerController {
            move_force: 40.0,
            jump_impulse: 6.0,
            crate_texture: crate_tex,
        }))?;
    }
    engine.add_game_object(player)?;
    colored(engine, player, player_tex)?;

    Ok(player)
}

fn load_config() -> Result<EngineConfig> {
    if Path::new(CONFIG_PATH).exists() {
        Ok(EngineConfig::load(CONFIG_PATH)?)
    } else {
        Ok(EngineConfig::default())
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rusted Engine demo...");

    let config = load_config()?;

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .with_resizable(true)
            .build(&event_loop)?,
    );

    let renderer = pollster::block_on(WgpuRenderer::new(window.clone()))?;
    let mut engine = Engine::new(config, renderer)?;

    let player = if engine
        .resources()
        .loader()
        .exists(AssetType::Scene, DEMO_SCENE)
    {
        let ids = engine.load_scene(DEMO_SCENE)?;
        engine.find_by_tag("player").first().copied().or(ids.first().copied())
    } else {
        Some(build_demo_level(&mut engine)?)
    };
    engine.start()?;

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    engine.shutdown();
                    elwt.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    engine.renderer_mut().resize(physical_size);
                }
                WindowEvent::Focused(false) => engine.input_mut().reset(),
                WindowEvent::KeyboardInput { event, .. } => {
                    engine.input_mut().process_keyboard_event(&event);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    engine.input_mut().process_mouse_event(button, state);
                }
                WindowEvent::RedrawRequested => {
                    if let Some(center) = player
                        .and_then(|id| engine.object(id).ok())
                        .and_then(|object| object.transform())
                        .map(|t| t.position())
                    {
                        engine.renderer_mut().camera_mut().center_on(center.into());
                    }
                    if let Err(e) = engine.advance_wall_clock() {
                        warn!("Frame finished with errors: {}", e);
                    }
                    if engine.is_quit() {
                        engine.shutdown();
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            Event::LoopExiting => {
                if !engine.is_quit() {
                    engine.shutdown();
                }
            }
            _ => {}
        })
        .map_err(|e| {
            error!("Event loop error: {}", e);
            anyhow::anyhow!("Event loop error: {}", e)
        })?;

    Ok(())
}
