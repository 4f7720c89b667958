// crates/sv_query/src/session.rs

//! 交互会话
//!
//! 把数据仓库、切片引擎、色标计算和视图状态组合在一起，
//! 对外提供"翻步 / 换层 / 换分区 / 换场 / 切片 / 取值"等操作。
//! 可恢复的失败只更新状态栏文字，致命错误以 `Err` 返回。

use sv_foundation::{Point2D, SvError, SvResult};
use sv_mesh::{CentroidIndex, PartitionScope};
use sv_state::{FieldKind, MeshPartitionStore, StepRequest};
use tracing::{debug, warn};

use crate::context::{QueryContext, ViewTransform};
use crate::frame::{DisplayMode, RenderFrame, RenderSink, ScalarSource, VectorSource};
use crate::probe::{probe, ProbeResult};
use crate::range::RangeNormalizer;
use crate::slice::{SliceBuffer, SliceEngine, SliceOptions, SliceOutcome};

/// 切片无效时的状态栏文字
pub const MSG_BAD_SLICE: &str = "Cannot plot this slice!";

/// 交互会话
#[derive(Debug)]
pub struct ViewerSession {
    store: MeshPartitionStore,
    index: CentroidIndex,
    engine: SliceEngine,
    normalizer: RangeNormalizer,
    ctx: QueryContext,
    mode: DisplayMode,
    view: Option<ViewTransform>,
    last_probe: Option<ProbeResult>,
    status: String,
}

impl ViewerSession {
    /// 创建会话并加载第 1 个输出步
    ///
    /// 初始层为 `Nkmax/2 - 1`，显示自由面，范围为全部分区。
    pub fn new(mut store: MeshPartitionStore, options: SliceOptions) -> SvResult<Self> {
        if store.n_snapshots() == 0 {
            return Err(SvError::invalid_input("没有可加载的输出步 (nsteps < ntout)"));
        }
        store.load_timestep(StepRequest::Output(1))?;
        let layer = (store.n_layers() / 2).saturating_sub(1);
        let index = CentroidIndex::build(store.topology());
        Ok(Self {
            store,
            index,
            engine: SliceEngine::new(options),
            normalizer: RangeNormalizer::new(),
            ctx: QueryContext::new(1, layer, FieldKind::FreeSurface, PartitionScope::All),
            mode: DisplayMode::Plan,
            view: None,
            last_probe: None,
            status: format!("SunView v{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// 数据仓库
    pub fn store(&self) -> &MeshPartitionStore {
        &self.store
    }

    /// 当前查询上下文
    pub fn context(&self) -> &QueryContext {
        &self.ctx
    }

    /// 显示模式
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// 状态栏文字
    pub fn status(&self) -> &str {
        &self.status
    }

    /// 当前切片（切片模式下）
    pub fn slice(&self) -> Option<&SliceBuffer> {
        match self.mode {
            DisplayMode::Slice => self.engine.buffer(),
            _ => None,
        }
    }

    /// 引擎中保留的切片选取，与显示模式无关
    pub fn retained_slice(&self) -> Option<&SliceBuffer> {
        self.engine.buffer()
    }

    /// 最近一次取值
    pub fn last_probe(&self) -> Option<&ProbeResult> {
        self.last_probe.as_ref()
    }

    /// 设置绘图区变换
    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = Some(view);
    }

    // ------------------------------------------------------------------
    // 时间步
    // ------------------------------------------------------------------

    /// 下一步
    pub fn next_step(&mut self) -> SvResult<bool> {
        if self.ctx.step < self.store.n_snapshots() {
            self.goto_step(self.ctx.step + 1)
        } else {
            self.status = "At n=nsteps!".into();
            Ok(false)
        }
    }

    /// 上一步
    pub fn prev_step(&mut self) -> SvResult<bool> {
        if self.ctx.step > 1 {
            self.goto_step(self.ctx.step - 1)
        } else {
            self.status = "At n=1!".into();
            Ok(false)
        }
    }

    /// 第一步
    pub fn first_step(&mut self) -> SvResult<bool> {
        self.goto_step(1)
    }

    /// 最后一步
    pub fn last_step(&mut self) -> SvResult<bool> {
        self.goto_step(self.store.n_snapshots())
    }

    /// 跳到第 `step` 步（截断到 `1..=n_snapshots`），返回是否需要重绘
    pub fn goto_step(&mut self, step: usize) -> SvResult<bool> {
        let step = step.clamp(1, self.store.n_snapshots());
        if step == self.ctx.step {
            return Ok(false);
        }
        self.store.load_timestep(StepRequest::Output(step))?;
        self.ctx.step = step;
        self.refresh_slice()?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // 垂向层
    // ------------------------------------------------------------------

    /// 向下一层
    pub fn layer_down(&mut self) -> bool {
        if self.ctx.layer + 1 < self.store.n_layers() {
            self.ctx.layer += 1;
            true
        } else {
            self.status = "At k=Nkmax!".into();
            false
        }
    }

    /// 向上一层
    pub fn layer_up(&mut self) -> bool {
        if self.ctx.layer > 0 {
            self.ctx.layer -= 1;
            true
        } else {
            self.status = "At k=1!".into();
            false
        }
    }

    /// 跳到第 `layer` 层（截断到有效范围）
    pub fn set_layer(&mut self, layer: usize) -> bool {
        let layer = layer.min(self.store.n_layers().saturating_sub(1));
        let changed = layer != self.ctx.layer;
        self.ctx.layer = layer;
        changed
    }

    // ------------------------------------------------------------------
    // 分区
    // ------------------------------------------------------------------

    /// 下一个分区（循环）；从"全部分区"切换时落在最后一个分区
    pub fn next_partition(&mut self) -> SvResult<bool> {
        let n = self.store.topology().n_partitions();
        if n <= 1 {
            return Ok(false);
        }
        let p = match self.ctx.scope {
            PartitionScope::All => n - 1,
            PartitionScope::Single(p) => (p + 1) % n,
        };
        self.change_scope(PartitionScope::Single(p))?;
        Ok(true)
    }

    /// 上一个分区（循环）；从"全部分区"切换时落在第一个分区
    pub fn prev_partition(&mut self) -> SvResult<bool> {
        let n = self.store.topology().n_partitions();
        if n <= 1 {
            return Ok(false);
        }
        let p = match self.ctx.scope {
            PartitionScope::All => 0,
            PartitionScope::Single(p) => (p + n - 1) % n,
        };
        self.change_scope(PartitionScope::Single(p))?;
        Ok(true)
    }

    /// 直接设置分区范围，越界的单分区被拒绝
    pub fn set_scope(&mut self, scope: PartitionScope) -> SvResult<()> {
        if let PartitionScope::Single(p) = scope {
            SvError::check_index("partition", p, self.store.topology().n_partitions())?;
        }
        self.change_scope(scope)
    }

    /// 显示全部分区
    pub fn show_all_partitions(&mut self) -> SvResult<bool> {
        if self.store.topology().n_partitions() <= 1 || self.ctx.scope == PartitionScope::All {
            return Ok(false);
        }
        self.status = "Plotting all procs...".into();
        self.change_scope(PartitionScope::All)?;
        Ok(true)
    }

    /// 切换范围；切片模式下用原端点在新范围内重新选取
    fn change_scope(&mut self, scope: PartitionScope) -> SvResult<()> {
        self.ctx.scope = scope;
        let line = match (self.mode, self.engine.buffer()) {
            (DisplayMode::Slice, Some(buffer)) => buffer.line,
            _ => return Ok(()),
        };
        if let Err(e) = self.slice_world(line.start, line.end) {
            self.clear_slice();
            return Err(e);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 场
    // ------------------------------------------------------------------

    /// 切换场
    pub fn set_field(&mut self, field: FieldKind) -> SvResult<bool> {
        if field == self.ctx.field {
            self.status = format!("{} is already being displayed...", field);
            return Ok(false);
        }
        self.ctx.field = field;
        self.status = format!("{} selected...", field);
        self.refresh_slice()?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // 切片与取值
    // ------------------------------------------------------------------

    /// 用数据坐标求切片
    pub fn slice_world(&mut self, start: Point2D, end: Point2D) -> SvResult<SliceOutcome> {
        let outcome = self
            .engine
            .get_slice(&self.store, &self.index, start, end, &self.ctx)?;
        self.apply_slice_outcome(outcome);
        Ok(outcome)
    }

    /// 用绘图区像素坐标求切片
    pub fn slice_pixels(&mut self, start: (f64, f64), end: (f64, f64)) -> SvResult<SliceOutcome> {
        let view = self.require_view()?;
        self.slice_world(view.to_world(start.0, start.1), view.to_world(end.0, end.1))
    }

    /// 回到平面显示并丢弃切片
    pub fn clear_slice(&mut self) {
        self.engine.clear();
        self.mode = DisplayMode::Plan;
    }

    /// 用数据坐标取值
    pub fn probe_world(&mut self, point: Point2D) -> Option<ProbeResult> {
        let result = probe(&self.store, &self.index, point, &self.ctx);
        self.mode = DisplayMode::Probe;
        self.last_probe = result;
        if let Some(r) = &result {
            self.status = r.message();
        }
        result
    }

    /// 用绘图区像素坐标取值
    pub fn probe_pixel(&mut self, px: f64, py: f64) -> SvResult<Option<ProbeResult>> {
        let view = self.require_view()?;
        Ok(self.probe_world(view.to_world(px, py)))
    }

    // ------------------------------------------------------------------
    // 绘制
    // ------------------------------------------------------------------

    /// 生成当前帧
    pub fn frame(&mut self) -> RenderFrame {
        let slice = match self.mode {
            DisplayMode::Slice => self.engine.buffer(),
            _ => None,
        };
        let range = self
            .normalizer
            .compute_scalar_range(&self.store, &self.ctx, slice);
        let umag_max = self
            .normalizer
            .compute_vector_magnitude_max(&self.store, &self.ctx, slice);

        let snapshot = self.store.snapshot();
        let partitions = || self.ctx.scope.partitions(snapshot.n_partitions());
        let (scalar, vectors) = match slice {
            Some(buffer) => (ScalarSource::slice(buffer), VectorSource::slice(buffer)),
            None => (
                ScalarSource::plan(snapshot, self.ctx.field, self.ctx.layer, partitions()),
                VectorSource::plan(snapshot, self.ctx.layer, partitions()),
            ),
        };

        RenderFrame {
            mode: self.mode,
            field: self.ctx.field,
            step: snapshot.step(),
            layer: self.ctx.layer,
            scalar,
            range,
            vectors,
            umag_max,
            layer_interfaces: self.store.layer_interfaces().to_vec(),
            status: self.status.clone(),
        }
    }

    /// 生成当前帧并交给绘制端
    pub fn render(&mut self, sink: &mut dyn RenderSink) -> SvResult<()> {
        let frame = self.frame();
        sink.render(&frame)
    }

    fn require_view(&self) -> SvResult<ViewTransform> {
        self.view
            .ok_or_else(|| SvError::invalid_input("尚未设置绘图区，无法换算像素坐标"))
    }

    fn refresh_slice(&mut self) -> SvResult<()> {
        if self.mode == DisplayMode::Slice {
            let outcome = self.engine.resample(&self.store, &self.ctx)?;
            self.apply_slice_outcome(outcome);
        }
        Ok(())
    }

    fn apply_slice_outcome(&mut self, outcome: SliceOutcome) {
        match outcome {
            SliceOutcome::Valid(n) => {
                debug!("切片有效: {} 个采样", n);
                self.mode = DisplayMode::Slice;
            }
            SliceOutcome::Invalid(reason) => {
                warn!("切片无效: {:?}", reason);
                self.mode = DisplayMode::Plan;
                self.status = MSG_BAD_SLICE.into();
            }
        }
    }
}
