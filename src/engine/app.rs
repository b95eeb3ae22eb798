// The engine: owns every game object and drives the frame loop

use log::{debug, error, info, warn};
use std::time::Duration;

use crate::core::{EngineError, Result, Vector2};
use crate::engine::assets::ResourceManager;
use crate::engine::config::EngineConfig;
use crate::engine::game_loop::{Clock, GameLoop};
use crate::engine::input::InputHandler;
use crate::engine::physics::{BodyKind, PhysicsEngine};
use crate::engine::renderer::{RenderBackend, TextureInfo};
use crate::engine::scene::{
    Animator, Collider, Command, Commands, EntityRecord, FrameContext, GameObject,
    GameObjectArena, GameObjectId, SceneDescription, SpriteRenderer, TileMap, Transform,
};

/// Runtime that owns the scene, the physics world and the services objects
/// use, and runs frames in the order Input, PhysicsEngine::update,
/// GameObject::update, render.
///
/// Destruction is only observed at frame boundaries: each pass iterates over
/// an id snapshot and skips objects destroyed along the way, and bodies of
/// destroyed objects are released before the next physics step.
pub struct Engine<R: RenderBackend> {
    config: EngineConfig,
    objects: GameObjectArena,
    physics: PhysicsEngine,
    input: InputHandler,
    resources: ResourceManager,
    renderer: R,
    clock: Clock,
    commands: Commands,
    game_loop: GameLoop,

    started: bool,
    quit: bool,
    /// Remaining ms of frame time during which logic and physics are frozen
    halt_ms: u32,
    frame_count: u64,
}

impl<R: RenderBackend> Engine<R> {
    pub fn new(config: EngineConfig, renderer: R) -> Result<Self> {
        config.validate()?;

        let mut physics = PhysicsEngine::with_gravity(config.gravity);
        physics.set_scale_factor(config.scale)?;

        info!(
            "Engine created: '{}' {}x{}, {} ms step",
            config.title, config.width, config.height, config.fixed_timestep_ms
        );

        Ok(Self {
            resources: ResourceManager::new(&config.asset_root),
            game_loop: GameLoop::new(config.fixed_timestep_ms, config.max_steps_per_frame),
            config,
            objects: GameObjectArena::new(),
            physics,
            input: InputHandler::new(),
            renderer,
            clock: Clock::new(),
            commands: Commands::new(),
            started: false,
            quit: false,
            halt_ms: 0,
            frame_count: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start every object created so far. Objects created later start at
    /// their first update.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        info!("Starting engine with {} objects", self.objects.len());

        let mut first_error = None;
        for id in self.objects.live_ids() {
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            let mut ctx = FrameContext {
                physics: &mut self.physics,
                input: &self.input,
                clock: &self.clock,
                commands: &mut self.commands,
            };
            if let Err(e) = object.start(&mut ctx) {
                error!("Failed to start {} ('{}'): {}", id, object.tag(), e);
                first_error.get_or_insert(e);
            }
        }
        let applied = self.apply_commands();
        first_error.map_or(applied, Err)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // ---- object lifecycle ----

    /// Create an object carrying the four core components, not yet in the
    /// physics world
    pub fn create_object(&mut self, tag: &str) -> Result<GameObjectId> {
        let mut object = GameObject::new(tag);
        object.set_duplicate_policy(self.config.duplicate_policy);
        object.ensure_core_components()?;
        let id = self.objects.insert(object);
        debug!("Created {} ('{}')", id, tag);
        Ok(id)
    }

    /// Create an object with a static body centered at `position`
    pub fn create_static_object(
        &mut self,
        tag: &str,
        position: Vector2,
        size: Vector2,
    ) -> Result<GameObjectId> {
        let id = self.create_object(tag)?;
        if let Some(transform) = self.object_mut(id)?.transform_mut() {
            transform.set_position(position);
            transform.set_size(size);
        }
        self.add_tile(id)?;
        Ok(id)
    }

    /// Take ownership of an object built elsewhere. Missing core components
    /// are filled in; no body is created.
    pub fn spawn(&mut self, mut object: GameObject) -> Result<GameObjectId> {
        object.ensure_core_components()?;
        let tag = object.tag().to_string();
        let id = self.objects.insert(object);
        debug!("Spawned {} ('{}')", id, tag);
        Ok(id)
    }

    /// Build an object from a scene record, loading its sprite and
    /// animation sheet and creating its body
    pub fn spawn_record(&mut self, record: EntityRecord) -> Result<GameObjectId> {
        let mut object = GameObject::new(&record.tag);
        object.set_duplicate_policy(self.config.duplicate_policy);

        let mut transform = Transform::at(record.position.x, record.position.y);
        if let Some(size) = record.size {
            transform = transform.with_size(size.x, size.y);
        }
        object.add_component(transform)?;

        let sheet = match &record.animation {
            Some(name) => Some(self.resources.animation_sheet(name)?),
            None => None,
        };
        // The sheet's own image stands in for a missing sprite
        let sprite_name = record
            .sprite
            .clone()
            .or_else(|| sheet.as_ref().and_then(|s| s.texture.clone()));

        let mut sprite = SpriteRenderer::new();
        if let Some(name) = sprite_name {
            let texture = self.texture(&name)?;
            sprite.set_sprite(texture);
            if let Some(sheet) = &sheet {
                sprite.set_sprite_size(Vector2::new(
                    sheet.sprite_width as f32,
                    sheet.sprite_height as f32,
                ));
            }
        }
        if let Some(size) = record.sprite_size {
            sprite.set_sprite_size(size);
        }
        object.add_component(sprite)?;

        if let Some(sheet) = sheet {
            let mut animator = Animator::with_sheet(sheet);
            if let Some(name) = &record.autoplay {
                animator = animator.autoplay(name, record.autoplay_mode);
            }
            object.add_component(animator)?;
        }

        let mut collider = Collider::new().with_scale(record.collider.scale);
        collider.set_sensor(record.collider.is_sensor);
        collider.set_sensor_scale(record.collider.sensor_scale);
        object.add_component(collider)?;

        let id = self.spawn(object)?;
        if let Some(kind) = record.body {
            self.add_body(id, kind)?;
        }
        Ok(id)
    }

    /// One static tile object per placed cell of `map`
    pub fn create_tile_map(&mut self, map: &TileMap) -> Result<Vec<GameObjectId>> {
        map.validate()?;
        let texture = match &map.texture {
            Some(name) => Some(self.texture(name)?),
            None => None,
        };

        let size = map.tile_size();
        let mut ids = Vec::new();
        for (col, row, number) in map.placed_tiles() {
            let center = map.tile_center(col, row);
            let mut object = GameObject::new("tile")
                .with(Transform::at(center.x, center.y).with_size(size.x, size.y))?;

            let mut sprite = SpriteRenderer::new();
            if let Some(texture) = texture {
                sprite.set_sprite_detail(texture.handle, map.tile_rect(number));
                sprite.set_sprite_size(size);
            }
            object.add_component(sprite)?;

            let id = self.spawn(object)?;
            self.add_tile(id)?;
            ids.push(id);
        }
        info!("Created tile map with {} tiles", ids.len());
        Ok(ids)
    }

    /// Load a scene from the scenes directory
    pub fn load_scene(&mut self, name: &str) -> Result<Vec<GameObjectId>> {
        let scene = self.resources.scene(name)?;
        info!("Loading scene '{}'", name);
        self.apply_scene(scene)
    }

    /// Configure the world and create every tile and entity of `scene`
    pub fn apply_scene(&mut self, scene: SceneDescription) -> Result<Vec<GameObjectId>> {
        if let Some(gravity) = scene.gravity {
            self.set_gravity(gravity)?;
        }
        if let Some(scale) = scene.scale {
            self.set_scale_factor(scale)?;
        }

        let mut ids = match &scene.tile_map {
            Some(map) => self.create_tile_map(map)?,
            None => Vec::new(),
        };
        for record in scene.entities {
            ids.push(self.spawn_record(record)?);
        }
        Ok(ids)
    }

    /// Mark an object destroyed and release its body. The object stays
    /// readable until the next sweep.
    pub fn destroy_game_object(&mut self, id: GameObjectId) -> Result<()> {
        let object = self
            .objects
            .get_mut(id)
            .ok_or_else(|| stale(id))?;
        object.destroy();
        if self.physics.is_bound(id) {
            self.physics.remove_game_object(object)?;
        }
        Ok(())
    }

    /// Ids of live objects, in creation order
    pub fn game_objects(&self) -> Vec<GameObjectId> {
        self.objects.live_ids()
    }

    /// Object by id, destroyed ones included until swept
    pub fn object(&self, id: GameObjectId) -> Result<&GameObject> {
        self.objects.get(id).ok_or_else(|| stale(id))
    }

    pub fn object_mut(&mut self, id: GameObjectId) -> Result<&mut GameObject> {
        self.objects.get_mut(id).ok_or_else(|| stale(id))
    }

    /// Objects by tag, live ones only
    pub fn find_by_tag(&self, tag: &str) -> Vec<GameObjectId> {
        self.objects
            .iter()
            .filter(|(_, object)| !object.is_destroyed() && object.tag() == tag)
            .map(|(id, _)| id)
            .collect()
    }

    // ---- physics ----

    /// Give the object a dynamic body
    pub fn add_game_object(&mut self, id: GameObjectId) -> Result<()> {
        self.add_body(id, BodyKind::Dynamic)
    }

    /// Give the object a static body
    pub fn add_tile(&mut self, id: GameObjectId) -> Result<()> {
        self.add_body(id, BodyKind::Static)
    }

    fn add_body(&mut self, id: GameObjectId, kind: BodyKind) -> Result<()> {
        let object = self.objects.get_mut(id).ok_or_else(|| stale(id))?;
        if object.is_destroyed() {
            return Err(EngineError::InvalidState(format!("{} is destroyed", id)));
        }
        self.physics.add_body(object, kind)
    }

    pub fn remove_game_object(&mut self, id: GameObjectId) -> Result<()> {
        let object = self.objects.get_mut(id).ok_or_else(|| stale(id))?;
        self.physics.remove_game_object(object)
    }

    pub fn set_gravity(&mut self, gravity: Vector2) -> Result<()> {
        self.physics.set_gravity(gravity)
    }

    pub fn set_scale_factor(&mut self, scale: f32) -> Result<()> {
        self.physics.set_scale_factor(scale)
    }

    pub fn set_object_gravity_scale(&mut self, id: GameObjectId, scale: f32) -> Result<()> {
        self.physics.set_object_gravity_scale(id, scale)
    }

    pub fn set_object_linear_velocity(&mut self, id: GameObjectId, velocity: Vector2) -> Result<()> {
        self.physics.set_object_linear_velocity(id, velocity)
    }

    pub fn object_linear_velocity(&self, id: GameObjectId) -> Result<Vector2> {
        self.physics.get_object_linear_velocity(id)
    }

    /// Density goes through the Collider so the component stays in sync
    pub fn set_object_density(&mut self, id: GameObjectId, density: f32) -> Result<()> {
        self.physics.set_density(id, density)?;
        if let Some(collider) = self.object_mut(id)?.collider_mut() {
            collider.set_density(density);
        }
        Ok(())
    }

    pub fn set_object_friction(&mut self, id: GameObjectId, friction: f32) -> Result<()> {
        self.physics.set_friction(id, friction)?;
        if let Some(collider) = self.object_mut(id)?.collider_mut() {
            collider.set_friction(friction);
        }
        Ok(())
    }

    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsEngine {
        &mut self.physics
    }

    // ---- services ----

    pub fn input(&self) -> &InputHandler {
        &self.input
    }

    /// Feed window events here before the frame runs
    pub fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    pub fn resources(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    /// Texture from the textures directory, created on this engine's backend
    pub fn texture(&mut self, name: &str) -> Result<TextureInfo> {
        self.resources.texture(&mut self.renderer, name)
    }

    /// Cached single-color texture
    pub fn color_texture(&mut self, name: &str, rgba: [u8; 4]) -> Result<TextureInfo> {
        self.resources.color_texture(&mut self.renderer, name, rgba)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // ---- frame loop ----

    /// Run one full frame of `dt_ms`: logic update, render, end of frame.
    ///
    /// A failed render is logged and the frame is dropped; bookkeeping
    /// still runs. Errors raised by objects during the update are returned
    /// after the frame completes.
    pub fn frame(&mut self, dt_ms: u32) -> Result<()> {
        let result = self.update(dt_ms);
        self.render_or_skip();
        self.end_frame(true);
        result
    }

    /// Account for `elapsed` frame time: as many fixed updates as it covers,
    /// then one render
    pub fn advance(&mut self, elapsed: Duration) -> Result<()> {
        let steps = self.game_loop.advance(elapsed);
        self.run_steps(steps)
    }

    /// Like [`Engine::advance`], timed by the wall clock
    pub fn advance_wall_clock(&mut self) -> Result<()> {
        let steps = self.game_loop.begin_frame();
        self.run_steps(steps)
    }

    fn run_steps(&mut self, steps: u32) -> Result<()> {
        let step_ms = self.game_loop.timestep_ms();
        let mut first_error = None;
        for _ in 0..steps {
            if let Err(e) = self.update(step_ms) {
                first_error.get_or_insert(e);
            }
        }
        self.render_or_skip();
        // Keep input edges for the first update that can see them
        self.end_frame(steps > 0);
        first_error.map_or(Ok(()), Err)
    }

    pub fn game_loop(&self) -> &GameLoop {
        &self.game_loop
    }

    pub fn game_loop_mut(&mut self) -> &mut GameLoop {
        &mut self.game_loop
    }

    /// Advance physics by `dt_ms`, then update every live object and pull
    /// its body state. Frozen while halted.
    pub fn update(&mut self, dt_ms: u32) -> Result<()> {
        if self.halt_ms > 0 {
            self.halt_ms = self.halt_ms.saturating_sub(dt_ms);
            return Ok(());
        }
        let mut first_error = None;
        if !self.started {
            if let Err(e) = self.start() {
                first_error.get_or_insert(e);
            }
        }

        self.release_destroyed_bodies();
        self.physics.update(dt_ms as f32 / 1000.0);
        self.clock.advance(dt_ms);

        for id in self.objects.live_ids() {
            // Destroyed earlier in this pass
            let Some(object) = self.objects.get_mut(id) else {
                continue;
            };
            if object.is_destroyed() {
                continue;
            }
            let mut ctx = FrameContext {
                physics: &mut self.physics,
                input: &self.input,
                clock: &self.clock,
                commands: &mut self.commands,
            };
            if let Err(e) = object.update(dt_ms, &mut ctx) {
                error!("Update of {} ('{}') failed: {}", id, object.tag(), e);
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.apply_commands() {
            first_error.get_or_insert(e);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Clear, draw every live object, present
    pub fn render(&mut self) -> anyhow::Result<()> {
        self.renderer.clear(self.config.clear_color);
        for (_, object) in self.objects.iter() {
            object.render(&mut self.renderer)?;
        }
        self.renderer.present()
    }

    fn render_or_skip(&mut self) {
        if let Err(e) = self.render() {
            error!("Render failed, skipping frame: {:#}", e);
        }
    }

    /// Clear input edges and sweep destroyed objects on the configured
    /// interval
    fn end_frame(&mut self, consumed_input: bool) {
        if consumed_input {
            self.input.reset_input_signal();
        }
        self.frame_count += 1;

        let interval = self.config.sweep_interval_frames as u64;
        if interval > 0 && self.frame_count % interval == 0 {
            self.sweep();
        }
    }

    fn apply_commands(&mut self) -> Result<()> {
        let mut first_error = None;
        for command in self.commands.drain() {
            let result = match command {
                Command::Spawn(object) => self.spawn(object).map(|_| ()),
                Command::SpawnRecord(record) => self.spawn_record(record).map(|_| ()),
                Command::Destroy(id) => self.destroy_game_object(id),
                Command::Halt(ms) => {
                    self.halt(ms);
                    Ok(())
                }
                Command::Quit => {
                    self.quit();
                    Ok(())
                }
            };
            if let Err(e) = result {
                error!("Deferred command failed: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Drop bodies of objects destroyed without going through the engine
    fn release_destroyed_bodies(&mut self) {
        for id in self.objects.destroyed_ids() {
            if !self.physics.is_bound(id) {
                continue;
            }
            if let Some(object) = self.objects.get_mut(id) {
                if let Err(e) = self.physics.remove_game_object(object) {
                    warn!("Could not release body of {}: {}", id, e);
                }
            }
        }
    }

    /// Freeze logic and physics for `ms` of frame time; rendering goes on
    pub fn halt(&mut self, ms: u32) {
        debug!("Halting for {} ms", ms);
        self.halt_ms = ms;
    }

    pub fn is_halted(&self) -> bool {
        self.halt_ms > 0
    }

    pub fn quit(&mut self) {
        if !self.quit {
            info!("Quit requested");
            self.quit = true;
        }
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    /// Free destroyed objects. Their ids go stale.
    pub fn sweep(&mut self) -> usize {
        self.release_destroyed_bodies();
        let destroyed = self.objects.destroyed_ids();
        for id in &destroyed {
            self.objects.remove(*id);
        }
        if !destroyed.is_empty() {
            debug!("Swept {} destroyed objects", destroyed.len());
        }
        destroyed.len()
    }

    /// Destroy and free everything
    pub fn shutdown(&mut self) {
        let live = self.objects.live_ids();
        for id in live {
            if let Err(e) = self.destroy_game_object(id) {
                warn!("Shutdown: {}", e);
            }
        }
        let swept = self.sweep();
        self.resources.clear();
        self.quit = true;
        info!(
            "Engine shut down after {} frames ({} objects freed)",
            self.frame_count, swept
        );
    }
}

fn stale(id: GameObjectId) -> EngineError {
    EngineError::InvalidState(format!("{} does not exist", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Result;
    use crate::engine::input::KeyCode;
    use crate::engine::physics::PhysicsState;
    use crate::engine::renderer::HeadlessRenderer;
    use crate::engine::scene::{Component, DuplicatePolicy, Script, ScriptContext};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> Engine<HeadlessRenderer> {
        Engine::new(EngineConfig::default(), HeadlessRenderer::new()).unwrap()
    }

    fn body_at(engine: &mut Engine<HeadlessRenderer>, x: f32, y: f32) -> GameObjectId {
        let id = engine.create_object("box").unwrap();
        engine
            .object_mut(id)
            .unwrap()
            .transform_mut()
            .unwrap()
            .set_position(Vector2::new(x, y));
        engine.add_game_object(id).unwrap();
        id
    }

    #[test]
    fn test_create_object_has_core_components() {
        let mut engine = engine();
        let id = engine.create_object("thing").unwrap();
        let object = engine.object(id).unwrap();
        assert!(object.transform().is_some());
        assert!(object.sprite_renderer().is_some());
        assert!(object.animator().is_some());
        assert!(object.collider().is_some());
        assert_eq!(object.tag(), "thing");
    }

    #[test]
    fn test_duplicate_policy_from_config() {
        let config = EngineConfig {
            duplicate_policy: DuplicatePolicy::Replace,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config, HeadlessRenderer::new()).unwrap();
        let id = engine.create_object("a").unwrap();
        let object = engine.object_mut(id).unwrap();
        object.add_component(Transform::at(3.0, 4.0)).unwrap();
        assert_eq!(
            object.transform().unwrap().position(),
            Vector2::new(3.0, 4.0)
        );
    }

    #[test]
    fn test_position_matches_body_after_update() {
        let mut engine = engine();
        let id = body_at(&mut engine, 100.0, 50.0);
        for _ in 0..10 {
            engine.update(16).unwrap();
            let body = engine.physics().get_position(id).unwrap();
            let position = engine.object(id).unwrap().transform().unwrap().position();
            assert_eq!(position, body);
        }
    }

    #[test]
    fn test_body_created_at_preset_position() {
        let mut engine = engine();
        let id = body_at(&mut engine, 10.0, 20.0);

        let handle = engine.object(id).unwrap().physical_body().unwrap();
        let body = engine.physics().world().body(handle).unwrap();
        assert_relative_eq!(body.translation().x, 10.0 / 64.0);
        assert_relative_eq!(body.translation().y, 20.0 / 64.0);
    }

    #[test]
    fn test_falls_monotonically_under_gravity() {
        let mut engine = engine();
        engine.set_gravity(Vector2::new(0.0, 10.0)).unwrap();
        let id = body_at(&mut engine, 0.0, 0.0);

        let mut last_y = engine.object(id).unwrap().transform().unwrap().position().y;
        for _ in 0..30 {
            engine.update(16).unwrap();
            let y = engine.object(id).unwrap().transform().unwrap().position().y;
            assert!(y > last_y);
            last_y = y;
        }
    }

    #[test]
    fn test_overlapping_bodies_see_each_other() {
        let mut engine = engine();
        engine.set_gravity(Vector2::ZERO).unwrap();
        let a = body_at(&mut engine, 0.0, 0.0);
        let b = body_at(&mut engine, 32.0, 0.0);
        engine.update(16).unwrap();

        let contacts_a = engine.object(a).unwrap().collider().unwrap().contacts();
        let contacts_b = engine.object(b).unwrap().collider().unwrap().contacts();
        assert_eq!(contacts_a.len(), 1);
        assert_eq!(contacts_a[0].other, b);
        assert_eq!(contacts_b.len(), 1);
        assert_eq!(contacts_b[0].other, a);
    }

    #[test]
    fn test_sensor_and_solid_contacts_disjoint() {
        let mut engine = engine();
        engine.set_gravity(Vector2::ZERO).unwrap();
        let solid = body_at(&mut engine, 0.0, 0.0);
        let other = body_at(&mut engine, 40.0, 0.0);

        let sensor = engine.create_object("trigger").unwrap();
        {
            let object = engine.object_mut(sensor).unwrap();
            object.transform_mut().unwrap().set_position(Vector2::new(20.0, 0.0));
            object.collider_mut().unwrap().set_sensor(true);
        }
        engine.add_tile(sensor).unwrap();
        engine.update(16).unwrap();

        let collider = engine.object(solid).unwrap().collider().unwrap();
        assert!(collider.contacts().iter().any(|c| c.other == other));
        assert!(collider.sensor_contacts().iter().any(|c| c.other == sensor));
        for contact in collider.contacts() {
            assert!(collider
                .sensor_contacts()
                .iter()
                .all(|s| s.other != contact.other));
        }
    }

    #[test]
    fn test_add_then_remove_keeps_body_count() {
        let mut engine = engine();
        body_at(&mut engine, 0.0, 0.0);
        let before = engine.physics().body_count();

        let id = engine.create_object("temp").unwrap();
        engine.add_game_object(id).unwrap();
        engine.remove_game_object(id).unwrap();

        assert_eq!(engine.physics().body_count(), before);
        assert!(engine.object(id).unwrap().physical_body().is_none());
        assert!(engine.remove_game_object(id).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_destroyed_object_is_skipped_until_swept() {
        let mut engine = engine();
        let texture = engine
            .renderer_mut()
            .create_color_texture("red", [255, 0, 0, 255])
            .unwrap();
        let id = body_at(&mut engine, 0.0, 0.0);
        engine
            .object_mut(id)
            .unwrap()
            .sprite_renderer_mut()
            .unwrap()
            .set_sprite(texture);

        engine.frame(16).unwrap();
        assert_eq!(engine.renderer().last_frame().len(), 1);

        engine.destroy_game_object(id).unwrap();
        assert!(!engine.game_objects().contains(&id));
        assert_eq!(engine.physics().body_count(), 0);

        let before = engine.object(id).unwrap().transform().unwrap().position();
        engine.frame(16).unwrap();
        assert!(engine.renderer().last_frame().is_empty());
        let object = engine.object(id).unwrap();
        assert!(object.is_destroyed());
        assert_eq!(object.transform().unwrap().position(), before);

        assert_eq!(engine.sweep(), 1);
        assert!(engine.object(id).unwrap_err().is_invalid_state());
        assert!(engine.destroy_game_object(id).is_err());
    }

    #[test]
    fn test_sweep_interval() {
        let config = EngineConfig {
            sweep_interval_frames: 2,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config, HeadlessRenderer::new()).unwrap();
        let id = engine.create_object("gone").unwrap();
        engine.destroy_game_object(id).unwrap();

        engine.frame(16).unwrap();
        assert!(engine.object(id).is_ok());
        engine.frame(16).unwrap();
        assert!(engine.object(id).is_err());
    }

    #[test]
    fn test_scale_locked_once_running() {
        let mut engine = engine();
        engine.set_scale_factor(32.0).unwrap();
        body_at(&mut engine, 0.0, 0.0);

        assert_eq!(engine.physics().state(), PhysicsState::Running);
        assert!(matches!(
            engine.set_scale_factor(16.0),
            Err(EngineError::Configuration(_))
        ));
        assert!(matches!(
            engine.set_gravity(Vector2::ZERO),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_unbound_object_physics_calls_fail() {
        let mut engine = engine();
        let id = engine.create_object("ghost").unwrap();
        assert!(engine
            .set_object_linear_velocity(id, Vector2::ONE)
            .unwrap_err()
            .is_invalid_state());
        assert!(engine.object_linear_velocity(id).is_err());
        assert!(engine.set_object_gravity_scale(id, 0.0).is_err());
    }

    #[test]
    fn test_velocity_and_material_delegation() {
        let mut engine = engine();
        engine.set_gravity(Vector2::ZERO).unwrap();
        let id = body_at(&mut engine, 0.0, 0.0);

        engine
            .set_object_linear_velocity(id, Vector2::new(64.0, 0.0))
            .unwrap();
        assert_relative_eq!(engine.object_linear_velocity(id).unwrap().x, 64.0);

        engine.set_object_density(id, 3.0).unwrap();
        engine.set_object_friction(id, 0.1).unwrap();
        let collider = engine.object(id).unwrap().collider().unwrap();
        assert_relative_eq!(collider.density(), 3.0);
        assert_relative_eq!(collider.friction(), 0.1);
    }

    struct Jumper;

    impl Script for Jumper {
        fn update(&mut self, ctx: &mut ScriptContext<'_>) -> Result<()> {
            if ctx.key_down(KeyCode::Space) {
                ctx.set_velocity(Vector2::new(0.0, -300.0))?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_script_sees_input_for_one_frame() {
        let mut engine = engine();
        engine.set_gravity(Vector2::ZERO).unwrap();
        let id = body_at(&mut engine, 0.0, 0.0);
        engine
            .object_mut(id)
            .unwrap()
            .add_component(Component::script(Jumper))
            .unwrap();
        engine.start().unwrap();

        engine.input_mut().key_down(KeyCode::Space);
        engine.frame(16).unwrap();
        assert!(!engine.input().get_key_down(KeyCode::Space));

        engine.update(16).unwrap();
        assert!(engine.object_linear_velocity(id).unwrap().y < 0.0);
    }

    struct Spawner {
        remaining: u32,
    }

    impl Script for Spawner {
        fn update(&mut self, ctx: &mut ScriptContext<'_>) -> Result<()> {
            if self.remaining > 0 {
                self.remaining -= 1;
                ctx.commands
                    .spawn_record(EntityRecord::new("bullet", Vector2::new(0.0, 0.0)));
            } else {
                ctx.commands.quit();
            }
            Ok(())
        }
    }

    #[test]
    fn test_commands_apply_at_frame_end() {
        let mut engine = engine();
        let spawner = engine.create_object("spawner").unwrap();
        engine
            .object_mut(spawner)
            .unwrap()
            .add_component(Component::script(Spawner { remaining: 2 }))
            .unwrap();

        engine.frame(16).unwrap();
        assert_eq!(engine.find_by_tag("bullet").len(), 1);
        engine.frame(16).unwrap();
        assert_eq!(engine.find_by_tag("bullet").len(), 2);
        assert_eq!(engine.physics().body_count(), 2);
        assert!(!engine.is_quit());

        engine.frame(16).unwrap();
        assert!(engine.is_quit());
    }

    struct Doomed;

    impl Script for Doomed {
        fn update(&mut self, ctx: &mut ScriptContext<'_>) -> Result<()> {
            ctx.destroy_self();
            Ok(())
        }
    }

    #[test]
    fn test_self_destroyed_body_released_before_next_step() {
        let mut engine = engine();
        let id = body_at(&mut engine, 0.0, 0.0);
        engine
            .object_mut(id)
            .unwrap()
            .add_component(Component::script(Doomed))
            .unwrap();

        engine.update(16).unwrap();
        assert!(engine.object(id).unwrap().is_destroyed());
        engine.update(16).unwrap();
        assert_eq!(engine.physics().body_count(), 0);
        assert!(engine.game_objects().is_empty());
    }

    /// Sensor that removes itself once anything enters it
    struct Pickup {
        collected_by: Rc<RefCell<Vec<GameObjectId>>>,
    }

    impl Script for Pickup {
        fn update(&mut self, ctx: &mut ScriptContext<'_>) -> Result<()> {
            let entered: Vec<GameObjectId> = ctx.contacts_began().collect();
            if !entered.is_empty() {
                self.collected_by.borrow_mut().extend(entered);
                let id = ctx.id();
                ctx.commands.destroy(id);
            }
            Ok(())
        }
    }

    #[test]
    fn test_script_sees_contact_began_events() {
        let mut engine = engine();
        engine.set_gravity(Vector2::ZERO).unwrap();
        let collected_by = Rc::new(RefCell::new(Vec::new()));

        let coin = engine.create_object("coin").unwrap();
        {
            let object = engine.object_mut(coin).unwrap();
            object.collider_mut().unwrap().set_sensor(true);
            object
                .add_component(Component::script(Pickup {
                    collected_by: collected_by.clone(),
                }))
                .unwrap();
        }
        engine.add_tile(coin).unwrap();

        engine.update(16).unwrap();
        assert!(collected_by.borrow().is_empty());
        assert!(!engine.object(coin).unwrap().is_destroyed());

        let player = body_at(&mut engine, 16.0, 0.0);
        engine.update(16).unwrap();

        assert_eq!(*collected_by.borrow(), vec![player]);
        assert!(engine.object(coin).unwrap().is_destroyed());
    }

    struct Failing;

    impl Script for Failing {
        fn update(&mut self, _ctx: &mut ScriptContext<'_>) -> Result<()> {
            Err(EngineError::InvalidState("boom".to_string()))
        }
    }

    #[test]
    fn test_failing_object_does_not_stop_the_frame() {
        let mut engine = engine();
        let bad = engine.create_object("bad").unwrap();
        engine
            .object_mut(bad)
            .unwrap()
            .add_component(Component::script(Failing))
            .unwrap();
        let good = body_at(&mut engine, 0.0, 0.0);

        assert!(engine.update(16).is_err());
        let body = engine.physics().get_position(good).unwrap();
        assert_eq!(
            engine.object(good).unwrap().transform().unwrap().position(),
            body
        );
    }

    #[test]
    fn test_render_failure_skips_frame_only() {
        let mut engine = engine();
        engine.renderer_mut().fail_next_present();
        engine.input_mut().key_down(KeyCode::A);

        engine.frame(16).unwrap();
        assert_eq!(engine.renderer().presented_frames(), 0);
        assert!(!engine.input().get_key_down(KeyCode::A));
        assert_eq!(engine.frame_count(), 1);

        engine.frame(16).unwrap();
        assert_eq!(engine.renderer().presented_frames(), 1);
    }

    #[test]
    fn test_halt_freezes_logic_but_renders() {
        let mut engine = engine();
        let id = body_at(&mut engine, 0.0, 0.0);
        engine.frame(16).unwrap();
        let y = engine.object(id).unwrap().transform().unwrap().position().y;
        let elapsed = engine.clock().elapsed_ms();

        engine.halt(32);
        engine.frame(16).unwrap();
        engine.frame(16).unwrap();
        assert!(!engine.is_halted());
        assert_eq!(engine.clock().elapsed_ms(), elapsed);
        assert_eq!(
            engine.object(id).unwrap().transform().unwrap().position().y,
            y
        );
        assert_eq!(engine.renderer().presented_frames(), 3);

        engine.frame(16).unwrap();
        assert!(engine.object(id).unwrap().transform().unwrap().position().y > y);
    }

    #[test]
    fn test_fixed_step_advance() {
        let mut engine = engine();
        engine.advance(Duration::from_millis(40)).unwrap();
        assert_eq!(engine.clock().elapsed_ms(), 32);
        assert_eq!(engine.renderer().presented_frames(), 1);

        // Input edges wait for a frame that runs an update
        engine.input_mut().key_down(KeyCode::W);
        engine.advance(Duration::from_millis(4)).unwrap();
        assert!(engine.input().get_key_down(KeyCode::W));
        engine.advance(Duration::from_millis(16)).unwrap();
        assert!(!engine.input().get_key_down(KeyCode::W));
    }

    #[test]
    fn test_apply_scene_with_tiles_and_entities() {
        let json = r#"{
            "gravity": { "x": 0.0, "y": 20.0 },
            "tile_map": {
                "tile_width": 64, "tile_height": 64, "sheet_columns": 4,
                "columns": 3, "rows": 2,
                "tiles": [-1, -1, -1, 0, 1, 2]
            },
            "entities": [
                { "tag": "player", "position": { "x": 96.0, "y": 0.0 } },
                { "tag": "coin", "position": { "x": 32.0, "y": 0.0 },
                  "collider": { "is_sensor": true }, "body": "Static" }
            ]
        }"#;
        let scene = SceneDescription::from_json_str(json).unwrap();
        let mut engine = engine();
        let ids = engine.apply_scene(scene).unwrap();

        assert_eq!(ids.len(), 5);
        assert_eq!(engine.find_by_tag("tile").len(), 3);
        assert_eq!(engine.physics().body_count(), 5);
        assert_eq!(engine.physics().gravity(), Vector2::new(0.0, 20.0));

        let coin = engine.find_by_tag("coin")[0];
        assert!(engine.object(coin).unwrap().collider().unwrap().is_sensor());
        let tile = engine.object(ids[0]).unwrap();
        assert_eq!(
            tile.transform().unwrap().position(),
            Vector2::new(32.0, 96.0)
        );
    }

    #[test]
    fn test_missing_sprite_reports_error() {
        let mut engine = engine();
        let mut record = EntityRecord::new("ghost", Vector2::ZERO);
        record.sprite = Some("does_not_exist.png".to_string());
        assert!(engine.spawn_record(record).is_err());
        assert!(engine.game_objects().is_empty());
    }

    #[test]
    fn test_shutdown_frees_everything() {
        let mut engine = engine();
        let a = body_at(&mut engine, 0.0, 0.0);
        body_at(&mut engine, 100.0, 0.0);
        engine.shutdown();

        assert!(engine.is_quit());
        assert_eq!(engine.physics().body_count(), 0);
        assert!(engine.object(a).is_err());
        assert!(engine.game_objects().is_empty());
    }
}
