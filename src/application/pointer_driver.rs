//! ポインタ駆動ワーカー
//!
//! ジェスチャ判定が書き込む目標状態を自分のtickレートで読み出し、
//! 平滑化移動とボタンのエッジ検出をOSポインタへ反映します。
//! 目標への到達は漸近的で、1tickで全距離を移動することはありません。

use crate::application::worker::Tickable;
use crate::domain::config::PointerConfig;
use crate::domain::error::DomainResult;
use crate::domain::ports::PointerPort;
use crate::domain::types::MouseButton;
use std::sync::{Arc, Mutex};

/// ジェスチャ側が書き込むポインタ目標
///
/// 座標は論理画面空間（設定の logical_width × logical_height）。
/// activeがfalseの間、ドライバは移動もクリックも発行しない。
#[derive(Clone, Copy, Debug, Default)]
struct TargetState {
    active: bool,
    target: Option<(f64, f64)>,
    primary: bool,
    secondary: bool,
}

/// 目標状態への書き込みハンドル（ジェスチャワーカー側）
///
/// クローン可能。書き込みはlast-write-winsで、ドライバは
/// 各tickで最新の状態だけを見る。
#[derive(Clone)]
pub struct PointerControl {
    state: Arc<Mutex<TargetState>>,
}

impl PointerControl {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TargetState::default())),
        }
    }

    /// 目標座標とタッチ状態を更新（制御アクティブ）
    pub fn update(&self, x: i32, y: i32, primary: bool, secondary: bool) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = TargetState {
            active: true,
            target: Some((x as f64, y as f64)),
            primary,
            secondary,
        };
    }

    /// 制御を解除する（手が見えない・複数写っている間）
    ///
    /// ポインタは現在位置に留まり、押下中のボタンは押下のまま。
    pub fn deactivate(&self) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.active = false;
    }

    /// 現在制御アクティブか（観測用）
    pub fn is_active(&self) -> bool {
        self.snapshot().active
    }

    fn snapshot(&self) -> TargetState {
        let guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard
    }
}

impl Default for PointerControl {
    fn default() -> Self {
        Self::new()
    }
}

/// bool遷移のエッジ検出器
///
/// false→true で押下、true→false で解放を1回だけ報告する。
/// 同じ状態が続く間は何も報告しない（チャタリング防止）。
#[derive(Debug, Default)]
struct ButtonEdge {
    previous: bool,
}

impl ButtonEdge {
    /// 現在値を観測し、(押下すべきか, 解放すべきか) を返す
    fn observe(&mut self, current: bool) -> (bool, bool) {
        let press = current && !self.previous;
        let release = !current && self.previous;
        self.previous = current;
        (press, release)
    }

    fn is_held(&self) -> bool {
        self.previous
    }
}

/// 距離比例の平滑化係数で現在位置を目標へ寄せる
///
/// 係数 f = distance_gain × 距離 + min_gain を両軸に適用する。
/// 遠いほど速く、近いほど遅く、min_gainで完全停止を防ぐ。
fn approach(current: (f64, f64), target: (f64, f64), config: &PointerConfig) -> (f64, f64) {
    let (cx, cy) = current;
    let (tx, ty) = target;
    let distance = ((tx - cx).powi(2) + (ty - cy).powi(2)).sqrt();
    let factor = config.distance_gain * distance + config.min_gain;
    (cx + factor * (tx - cx), cy + factor * (ty - cy))
}

/// OSポインタを駆動するtickワーカー
pub struct PointerDriver {
    pointer: Box<dyn PointerPort>,
    control: PointerControl,
    config: PointerConfig,
    primary_edge: ButtonEdge,
    secondary_edge: ButtonEdge,
    // 初回tickで問い合わせてキャッシュする物理画面サイズ
    screen: Option<(i32, i32)>,
}

impl PointerDriver {
    pub fn new(pointer: Box<dyn PointerPort>, control: PointerControl, config: PointerConfig) -> Self {
        Self {
            pointer,
            control,
            config,
            primary_edge: ButtonEdge::default(),
            secondary_edge: ButtonEdge::default(),
            screen: None,
        }
    }

    fn screen_size(&mut self) -> DomainResult<(i32, i32)> {
        if let Some(size) = self.screen {
            return Ok(size);
        }
        let size = self.pointer.screen_size()?;
        self.screen = Some(size);
        Ok(size)
    }

    /// 物理画面の端1pxを避けてクランプ
    ///
    /// 一部環境で画面端への移動がホットコーナー等を誘発するため、
    /// 可動域は [1, w-1] × [1, h-1] とする。
    fn clamp_to_screen(&mut self, x: f64, y: f64) -> DomainResult<(i32, i32)> {
        let (w, h) = self.screen_size()?;
        let cx = (x.round() as i32).clamp(1, w - 1);
        let cy = (y.round() as i32).clamp(1, h - 1);
        Ok((cx, cy))
    }

    /// 1tick分の移動とボタンエッジの反映
    fn drive(&mut self, state: TargetState) -> DomainResult<()> {
        if let Some(target) = state.target {
            let (cx, cy) = self.pointer.position()?;
            let (nx, ny) = approach((cx as f64, cy as f64), target, &self.config);
            let (nx, ny) = self.clamp_to_screen(nx, ny)?;
            self.pointer.move_to(nx, ny)?;
        }

        let (press, release) = self.primary_edge.observe(state.primary);
        if press {
            self.pointer.button_down(MouseButton::Primary)?;
        }
        if release {
            self.pointer.button_up(MouseButton::Primary)?;
        }

        let (press, release) = self.secondary_edge.observe(state.secondary);
        if press {
            self.pointer.button_down(MouseButton::Secondary)?;
        }
        if release {
            self.pointer.button_up(MouseButton::Secondary)?;
        }

        Ok(())
    }
}

impl Tickable for PointerDriver {
    fn step(&mut self) {
        let state = self.control.snapshot();
        if !state.active {
            return;
        }

        if let Err(e) = self.drive(state) {
            tracing::warn!("pointer tick failed: {}", e);
        }
    }

    /// 停止時、押しっぱなしのボタンを解放する（設定で無効化可能）
    fn finish(&mut self) {
        if !self.config.release_buttons_on_exit {
            return;
        }
        if self.primary_edge.is_held() {
            tracing::info!("releasing primary button on shutdown");
            if let Err(e) = self.pointer.button_up(MouseButton::Primary) {
                tracing::warn!("failed to release primary button: {}", e);
            }
        }
        if self.secondary_edge.is_held() {
            tracing::info!("releasing secondary button on shutdown");
            if let Err(e) = self.pointer.button_up(MouseButton::Secondary) {
                tracing::warn!("failed to release secondary button: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::{MockPointerAdapter, PointerAction};

    fn test_config() -> PointerConfig {
        PointerConfig::default()
    }

    #[test]
    fn test_approach_is_partial_not_teleport() {
        let config = test_config();
        let (nx, ny) = approach((0.0, 0.0), (1000.0, 0.0), &config);

        assert!(nx > 0.0, "moves toward target");
        assert!(nx < 1000.0, "does not reach target in one tick");
        assert_eq!(ny, 0.0);
    }

    #[test]
    fn test_approach_converges_with_decreasing_distance() {
        let config = test_config();
        let target = (1500.0, 800.0);
        let mut current = (10.0, 10.0);
        let mut last_distance = f64::INFINITY;

        for _ in 0..10_000 {
            current = approach(current, target, &config);
            let distance =
                ((target.0 - current.0).powi(2) + (target.1 - current.1).powi(2)).sqrt();
            assert!(distance < last_distance, "distance must strictly decrease");
            last_distance = distance;
            if last_distance < 1.0 {
                return;
            }
        }
        panic!("pointer never converged to within 1 unit");
    }

    #[test]
    fn test_approach_speed_scales_with_distance() {
        let config = test_config();
        let (far, _) = approach((0.0, 0.0), (1000.0, 0.0), &config);
        let (near, _) = approach((0.0, 0.0), (100.0, 0.0), &config);

        // 移動割合（係数）は距離に比例して増える
        assert!(far / 1000.0 > near / 100.0);
    }

    #[test]
    fn test_inactive_state_issues_nothing() {
        let (pointer, actions) = MockPointerAdapter::new((500, 500), (1920, 1080));
        let control = PointerControl::new();
        control.update(100, 100, true, false);
        control.deactivate();

        let mut driver = PointerDriver::new(Box::new(pointer), control, test_config());
        driver.step();

        assert!(actions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clamp_keeps_one_pixel_margin() {
        let (pointer, actions) = MockPointerAdapter::new((2, 2), (1920, 1080));
        let control = PointerControl::new();
        // min_gain項があるため負方向へも必ず動き、クランプが効く
        control.update(-5000, -5000, false, false);

        let mut config = test_config();
        config.distance_gain = 1.0; // 1tickで目標到達相当の移動量にする
        let mut driver = PointerDriver::new(Box::new(pointer), control, config);
        driver.step();

        let log = actions.lock().unwrap();
        assert_eq!(log[0], PointerAction::MoveTo(1, 1));
    }

    #[test]
    fn test_button_edges_fire_once() {
        let (pointer, actions) = MockPointerAdapter::new((500, 500), (1920, 1080));
        let control = PointerControl::new();
        let mut driver = PointerDriver::new(Box::new(pointer), control.clone(), test_config());

        // 押下継続2tick → 解放
        control.update(500, 500, true, false);
        driver.step();
        driver.step();
        control.update(500, 500, false, false);
        driver.step();

        let log = actions.lock().unwrap();
        let presses: Vec<_> = log
            .iter()
            .filter(|a| matches!(a, PointerAction::ButtonDown(MouseButton::Primary)))
            .collect();
        let releases: Vec<_> = log
            .iter()
            .filter(|a| matches!(a, PointerAction::ButtonUp(MouseButton::Primary)))
            .collect();
        assert_eq!(presses.len(), 1, "press fires once per transition");
        assert_eq!(releases.len(), 1, "release fires once per transition");
    }

    #[test]
    fn test_finish_releases_held_buttons() {
        let (pointer, actions) = MockPointerAdapter::new((500, 500), (1920, 1080));
        let control = PointerControl::new();
        let mut driver = PointerDriver::new(Box::new(pointer), control.clone(), test_config());

        control.update(500, 500, true, true);
        driver.step();
        driver.finish();

        let log = actions.lock().unwrap();
        assert!(log.contains(&PointerAction::ButtonUp(MouseButton::Primary)));
        assert!(log.contains(&PointerAction::ButtonUp(MouseButton::Secondary)));
    }

    #[test]
    fn test_finish_respects_opt_out() {
        let (pointer, actions) = MockPointerAdapter::new((500, 500), (1920, 1080));
        let control = PointerControl::new();
        let mut config = test_config();
        config.release_buttons_on_exit = false;
        let mut driver = PointerDriver::new(Box::new(pointer), control.clone(), config);

        control.update(500, 500, true, false);
        driver.step();
        driver.finish();

        let log = actions.lock().unwrap();
        assert!(!log.contains(&PointerAction::ButtonUp(MouseButton::Primary)));
    }

    #[test]
    fn test_reactivation_with_same_flag_emits_no_duplicate_press() {
        let (pointer, actions) = MockPointerAdapter::new((500, 500), (1920, 1080));
        let control = PointerControl::new();
        let mut driver = PointerDriver::new(Box::new(pointer), control.clone(), test_config());

        // 押下 → 制御解除 → 同じタッチ状態のまま再開
        control.update(500, 500, true, false);
        driver.step();
        control.deactivate();
        driver.step();
        control.update(500, 500, true, false);
        driver.step();

        let log = actions.lock().unwrap();
        let presses = log
            .iter()
            .filter(|a| matches!(a, PointerAction::ButtonDown(MouseButton::Primary)))
            .count();
        assert_eq!(presses, 1, "held flag must not re-press after reactivation");
    }

    #[test]
    fn test_deactivate_keeps_buttons_held() {
        let (pointer, actions) = MockPointerAdapter::new((500, 500), (1920, 1080));
        let control = PointerControl::new();
        let mut driver = PointerDriver::new(Box::new(pointer), control.clone(), test_config());

        control.update(500, 500, true, false);
        driver.step();
        control.deactivate();
        driver.step();

        // 制御解除中はエッジ検出自体が走らず、解放は発行されない
        let log = actions.lock().unwrap();
        assert!(!log.contains(&PointerAction::ButtonUp(MouseButton::Primary)));
    }
}
