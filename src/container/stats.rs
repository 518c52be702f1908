use std::sync::atomic::{AtomicU64, Ordering};

/// 内部容器统计信息（原子计数器）
#[derive(Default)]
pub(crate) struct InnerStats {
    total_resolutions: AtomicU64,
    parent_fallbacks: AtomicU64,
    alias_hops: AtomicU64,
    dynamic_invocations: AtomicU64,
    memoized_hits: AtomicU64,
    memoized_misses: AtomicU64,
    not_found: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Counter {
    Resolution,
    ParentFallback,
    AliasHop,
    DynamicInvocation,
    MemoizedHit,
    MemoizedMiss,
    NotFound,
}

impl InnerStats {
    pub(crate) fn record(&self, counter: Counter) {
        let slot = match counter {
            Counter::Resolution => &self.total_resolutions,
            Counter::ParentFallback => &self.parent_fallbacks,
            Counter::AliasHop => &self.alias_hops,
            Counter::DynamicInvocation => &self.dynamic_invocations,
            Counter::MemoizedHit => &self.memoized_hits,
            Counter::MemoizedMiss => &self.memoized_misses,
            Counter::NotFound => &self.not_found,
        };
        slot.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, registered_bindings: usize) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.total_resolutions.load(Ordering::Relaxed),
            parent_fallbacks: self.parent_fallbacks.load(Ordering::Relaxed),
            alias_hops: self.alias_hops.load(Ordering::Relaxed),
            dynamic_invocations: self.dynamic_invocations.load(Ordering::Relaxed),
            memoized_hits: self.memoized_hits.load(Ordering::Relaxed),
            memoized_misses: self.memoized_misses.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            registered_bindings,
        }
    }

    pub(crate) fn reset(&self) {
        for slot in [
            &self.total_resolutions,
            &self.parent_fallbacks,
            &self.alias_hops,
            &self.dynamic_invocations,
            &self.memoized_hits,
            &self.memoized_misses,
            &self.not_found,
        ] {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

/// 容器统计信息
///
/// 计数按容器独立统计：回退到父容器的查找在本容器和父容器中各计一次。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 本容器处理的查找次数
    pub total_resolutions: u64,
    /// 委托给父容器的次数
    pub parent_fallbacks: u64,
    /// 经过别名跳转的次数
    pub alias_hops: u64,
    /// 动态工厂调用次数
    pub dynamic_invocations: u64,
    /// 记忆化缓存命中次数
    pub memoized_hits: u64,
    /// 记忆化缓存未命中次数（即工厂调用次数）
    pub memoized_misses: u64,
    /// 整条父链都找不到的次数
    pub not_found: u64,
    /// 当前本地绑定数量
    pub registered_bindings: usize,
}

impl ContainerStats {
    /// 获取记忆化缓存命中率（小数形式）
    pub fn hit_rate(&self) -> f64 {
        let total = self.memoized_hits + self.memoized_misses;
        if total == 0 {
            0.0
        } else {
            self.memoized_hits as f64 / total as f64
        }
    }

    /// 获取性能指标摘要
    pub fn performance_summary(&self) -> String {
        format!(
            "Container: {} resolutions, {} parent fallbacks, {:.1}% memoized hit rate, {} registered bindings",
            self.total_resolutions,
            self.parent_fallbacks,
            self.hit_rate() * 100.0,
            self.registered_bindings
        )
    }
}
