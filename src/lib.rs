pub mod ai;
pub mod config;
pub mod game;
pub mod scene;
pub mod storage;

use glam::Vec3;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiConfig, AiError, BrowserTimer, Delay, EasyAi};
pub use config::{ConfigError, GameConfig};
pub use game::{
    create_deck, load_card_database, shuffle_deck, Battle, BattleError, Battlefield, Card,
    CardDatabase, CardDatabaseError, CardId, CardStats, CardType, CombatContext, CombatEvent,
    CombatMachine, CombatSignal, CombatState, Deck, DeckError, HandManager, Rarity, Turn, Winner,
};
pub use scene::{
    CameraConfig, CameraController, CameraState, FrameTimeStats, LodConfig, LodController,
    LodLevel, PerformanceConfig, PerformanceMonitor,
};
pub use storage::{
    AvatarCustomization, AvatarStore, CombatStore, KeyValueStore, MemoryStore, StorageError,
    StorageKind, WebStorage,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
}

fn to_js_error<E: Serialize + std::fmt::Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn signals_json(signals: Vec<CombatSignal>) -> Result<String, JsValue> {
    serde_json::to_string(&signals).map_err(serde_to_js_error)
}

/// 浏览器端的对局入口。
#[wasm_bindgen]
pub struct BattleEngine {
    battle: Battle,
    config: GameConfig,
}

#[wasm_bindgen]
impl BattleEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<BattleEngine, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => GameConfig::default(),
        };
        let database = load_card_database().map_err(to_js_error)?;
        let battle = Battle::new(database, &config).map_err(to_js_error)?;
        log::info!("battle engine ready");
        Ok(BattleEngine { battle, config })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.battle.view()).map_err(serde_to_js_error)
    }

    pub fn context_json(&self) -> Result<String, JsValue> {
        self.battle.context().to_json().map_err(serde_to_js_error)
    }

    pub fn hand_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.battle.player_hand().hand()).map_err(serde_to_js_error)
    }

    pub fn opponent_hand_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.battle.opponent_hand().hand()).map_err(serde_to_js_error)
    }

    pub fn start(&mut self) -> Result<String, JsValue> {
        signals_json(self.battle.start())
    }

    pub fn select_card(&mut self, index: Option<usize>) {
        self.battle.select_card(index);
    }

    pub fn play_card(&mut self, index: usize) -> Result<String, JsValue> {
        signals_json(self.battle.play_card(index))
    }

    pub fn animation_complete(&mut self) -> Result<String, JsValue> {
        signals_json(self.battle.animation_complete())
    }

    pub fn pass_turn(&mut self) -> Result<String, JsValue> {
        signals_json(self.battle.pass_turn())
    }

    /// 在 AI 延迟结束后返回它选择的手牌下标（让过时为 `null`）。
    /// 选择由对局自带的 AI 决定，设置了 `seed` 时可复现。
    pub fn think_ai(&mut self) -> Promise {
        let (millis, choice) = self.battle.plan_ai_turn().unwrap_or((0, None));

        future_to_promise(async move {
            BrowserTimer.sleep(millis).await;
            Ok(choice
                .map(|index| JsValue::from_f64(index as f64))
                .unwrap_or(JsValue::NULL))
        })
    }

    pub fn apply_ai_move(&mut self, index: Option<usize>) -> Result<String, JsValue> {
        signals_json(self.battle.complete_ai_turn(index))
    }

    pub fn ai_config(&self) -> Result<JsValue, JsValue> {
        to_value(&self.battle.ai_config()).map_err(JsValue::from)
    }

    pub fn set_ai_config(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: AiConfig = from_value(config).map_err(JsValue::from)?;
        self.battle.set_ai_config(config).map_err(to_js_error)
    }

    pub fn save_snapshot(&self) -> bool {
        match WebStorage::session() {
            Ok(store) => CombatStore::new(store).save_combat_state(self.battle.context()),
            Err(err) => {
                log::warn!("session storage unavailable: {err}");
                false
            }
        }
    }

    pub fn load_snapshot(&mut self) -> bool {
        let snapshot = WebStorage::session()
            .ok()
            .and_then(|store| CombatStore::new(store).load_combat_state());
        match snapshot {
            Some(context) => {
                self.battle.restore(context);
                true
            }
            None => false,
        }
    }

    pub fn clear_snapshot(&self) {
        if let Ok(store) = WebStorage::session() {
            CombatStore::new(store).clear_combat_state();
        }
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.config).map_err(serde_to_js_error)
    }
}

/// 帧率监测与 LOD 选择的 JS 包装。
#[wasm_bindgen]
pub struct FrameMonitor {
    monitor: PerformanceMonitor,
    lod: LodController,
}

#[wasm_bindgen]
impl FrameMonitor {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<FrameMonitor, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(serde_to_js_error)?,
            None => GameConfig::default(),
        };
        Ok(FrameMonitor {
            monitor: PerformanceMonitor::new(config.performance),
            lod: LodController::new(config.lod),
        })
    }

    pub fn record_frame_time(&mut self, millis: f64) {
        self.monitor.record_frame_time(millis);
    }

    pub fn average_fps(&self) -> f64 {
        self.monitor.average_fps()
    }

    pub fn should_reduce_quality(&self) -> bool {
        self.monitor.should_reduce_quality()
    }

    pub fn frame_time_stats(&self) -> Result<JsValue, JsValue> {
        to_value(&self.monitor.frame_time_stats()).map_err(JsValue::from)
    }

    pub fn lod_level(&self, camera_distance: f32) -> Result<JsValue, JsValue> {
        to_value(&self.lod.evaluate(camera_distance, &self.monitor)).map_err(JsValue::from)
    }

    pub fn reset(&mut self) {
        self.monitor.reset();
    }
}

/// 轨道相机的 JS 包装，位置以 `[x, y, z]` 返回。
#[wasm_bindgen]
pub struct OrbitCamera {
    controller: CameraController,
}

#[wasm_bindgen]
impl OrbitCamera {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<OrbitCamera, JsValue> {
        let config: CameraConfig = if config.is_undefined() || config.is_null() {
            CameraConfig::default()
        } else {
            from_value(config).map_err(JsValue::from)?
        };
        Ok(OrbitCamera {
            controller: CameraController::new(config),
        })
    }

    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.controller.orbit(delta_x, delta_y);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.controller.zoom(delta);
    }

    pub fn update(&mut self, dt: f32) {
        self.controller.update(dt);
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn set_look_at(&mut self, x: f32, y: f32, z: f32) {
        self.controller.set_look_at(Vec3::new(x, y, z));
    }

    pub fn position(&self) -> Vec<f32> {
        self.controller.position().to_array().to_vec()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_value(&self.controller.state()).map_err(JsValue::from)
    }
}

#[wasm_bindgen(js_name = "loadCardDatabase")]
pub fn load_card_database_js() -> Result<JsValue, JsValue> {
    let database = load_card_database().map_err(to_js_error)?;
    to_value(database).map_err(JsValue::from)
}

fn avatar_store() -> Option<AvatarStore<WebStorage>> {
    match WebStorage::local() {
        Ok(store) => Some(AvatarStore::new(store)),
        Err(err) => {
            log::warn!("local storage unavailable: {err}");
            None
        }
    }
}

#[wasm_bindgen(js_name = "saveCustomization")]
pub fn save_customization(avatar_id: &str, data: JsValue) -> bool {
    let Ok(data) = from_value::<AvatarCustomization>(data) else {
        return false;
    };
    avatar_store()
        .map(|avatars| avatars.save_customization(avatar_id, &data))
        .unwrap_or(false)
}

#[wasm_bindgen(js_name = "loadCustomization")]
pub fn load_customization(avatar_id: &str) -> JsValue {
    avatar_store()
        .and_then(|avatars| avatars.load_customization(avatar_id))
        .and_then(|data| to_value(&data).ok())
        .unwrap_or(JsValue::NULL)
}

#[wasm_bindgen(js_name = "clearCustomization")]
pub fn clear_customization(avatar_id: &str) {
    if let Some(avatars) = avatar_store() {
        avatars.clear_customization(avatar_id);
    }
}

#[wasm_bindgen(js_name = "getAllAvatarIds")]
pub fn get_all_avatar_ids() -> Vec<String> {
    avatar_store()
        .map(|avatars| avatars.get_all_avatar_ids())
        .unwrap_or_default()
}

#[wasm_bindgen(js_name = "clearAllCustomizations")]
pub fn clear_all_customizations() {
    if let Some(avatars) = avatar_store() {
        avatars.clear_all();
    }
}

#[wasm_bindgen(js_name = "isStorageAvailable")]
pub fn is_storage_available() -> bool {
    avatar_store()
        .map(|avatars| avatars.is_available())
        .unwrap_or(false)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
