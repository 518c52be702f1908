//! 依赖注入容器
//!
//! 注册表把 [`Identifier`] 映射到四种绑定策略之一：
//! - 别名（转到同一容器中的另一个标识符）
//! - 常量
//! - 动态工厂（每次解析都调用）
//! - 记忆化工厂（首次解析调用并缓存）
//!
//! 本地找不到的标识符会沿父容器链逐级查找。

mod binding;
mod resolution;
mod stats;

pub use binding::BindingKind;
pub use stats::ContainerStats;

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::ContainerConfig;
use crate::errors::{ContainerError, Result};
use crate::identifier::{Identifier, IdentifierKey};

use binding::{erase_factory, Binding, BindingId, ErasedValue, Registration};
use stats::{Counter, InnerStats};

/// 绑定注册表，可选地回退到父容器
///
/// 所有操作都只需要 `&self`，工厂函数可以通过收到的容器继续解析其他依赖。
/// 调用用户代码期间不持有注册表的锁。
pub struct Container {
    id: Uuid,
    config: ContainerConfig,
    /// 父容器，只用于查找回退；强引用，子容器会让父容器保持存活
    parent: RwLock<Option<Arc<Container>>>,
    /// 服务注册表
    registry: DashMap<IdentifierKey, Registration>,
    stats: InnerStats,
}

impl Container {
    /// 创建没有父容器的空容器
    pub fn new() -> Self {
        Self::with_parent_and_config(None, ContainerConfig::default())
    }

    /// 创建以 `parent` 为父容器的空容器，沿用父容器的配置
    ///
    /// 子容器持有父容器的 `Arc`，只要子容器存在父容器就不会被释放。
    pub fn with_parent(parent: Arc<Container>) -> Self {
        let config = parent.config;
        Self::with_parent_and_config(Some(parent), config)
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::with_parent_and_config(None, config)
    }

    pub fn with_parent_and_config(parent: Option<Arc<Container>>, config: ContainerConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            parent: RwLock::new(parent),
            registry: DashMap::new(),
            stats: InnerStats::default(),
        }
    }

    /// 创建以当前容器为父容器的子容器
    pub fn child(self: &Arc<Self>) -> Container {
        Container::with_parent(Arc::clone(self))
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn parent(&self) -> Option<Arc<Container>> {
        self.parent.read().clone()
    }

    /// 替换之后查找使用的父容器
    ///
    /// `parent` 是当前容器本身，或其祖先链中已包含当前容器时返回
    /// `InvalidOperation`。新的父容器由子容器强引用持有。
    /// 修改前已缓存的记忆化值保持不变。
    pub fn set_parent(&self, parent: Option<Arc<Container>>) -> Result<&Self> {
        if let Some(candidate) = &parent {
            if candidate.id == self.id {
                return Err(ContainerError::invalid(
                    "set_parent",
                    "Could not self-link container",
                ));
            }

            let mut ancestor = candidate.parent();
            while let Some(current) = ancestor {
                if current.id == self.id {
                    return Err(ContainerError::invalid(
                        "set_parent",
                        "Could not link container to one of its descendants",
                    ));
                }
                ancestor = current.parent();
            }
        }

        debug!(
            container = %self.id,
            parent = ?parent.as_ref().map(|p| p.id),
            "Parent container updated"
        );
        *self.parent.write() = parent;
        Ok(self)
    }

    /// 将 `identifier` 注册为 `resolve_to` 的别名
    ///
    /// 目标标识符通过当前容器解析，因此也可以经父容器回退找到。
    pub fn alias<T>(&self, identifier: &Identifier<T>, resolve_to: &Identifier<T>) -> Result<&Self> {
        if identifier == resolve_to {
            return Err(ContainerError::invalid(
                "alias",
                format!("Could not self-link dependency \"{}\"", identifier.name()),
            ));
        }

        self.insert(
            identifier,
            Binding::Alias {
                target: resolve_to.key(),
                target_name: resolve_to.shared_name(),
            },
        );
        Ok(self)
    }

    pub fn bind_constant<T>(&self, identifier: &Identifier<T>, value: T) -> &Self
    where
        T: Send + Sync + 'static,
    {
        self.bind_shared(identifier, Arc::new(value))
    }

    /// 绑定已共享的值，`resolve` 返回该 `Arc` 的克隆
    pub fn bind_shared<T>(&self, identifier: &Identifier<T>, value: Arc<T>) -> &Self
    where
        T: Send + Sync + 'static,
    {
        self.insert(identifier, Binding::Constant(value as ErasedValue));
        self
    }

    /// 注册动态工厂，每次解析都调用
    pub fn bind_dynamic<T, F>(&self, identifier: &Identifier<T>, factory: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.try_bind_dynamic(identifier, move |container| Ok(factory(container)))
    }

    /// 注册可失败的动态工厂，错误原样返回给 `resolve` 的调用方
    pub fn try_bind_dynamic<T, F>(&self, identifier: &Identifier<T>, factory: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.insert(identifier, Binding::Dynamic(erase_factory(factory)));
        self
    }

    /// 注册记忆化工厂，首次解析时调用一次
    pub fn bind_memoized<T, F>(&self, identifier: &Identifier<T>, factory: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.try_bind_memoized(identifier, move |container| Ok(factory(container)))
    }

    /// 注册可失败的记忆化工厂
    ///
    /// 工厂失败时不缓存任何值，下一次 `resolve` 会重新调用。
    pub fn try_bind_memoized<T, F>(&self, identifier: &Identifier<T>, factory: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.insert(
            identifier,
            Binding::Memoized {
                factory: erase_factory(factory),
                value: None,
            },
        );
        self
    }

    fn insert<T>(&self, identifier: &Identifier<T>, binding: Binding) {
        let kind = binding.kind();
        let replaced = self
            .registry
            .insert(
                identifier.key(),
                Registration {
                    id: BindingId::next(),
                    name: identifier.shared_name(),
                    binding,
                },
            )
            .is_some();

        debug!(
            container = %self.id,
            identifier = %identifier.name(),
            ?kind,
            replaced,
            "Binding registered"
        );
    }

    /// 本地注册表中是否有该标识符的绑定，不查询父容器
    pub fn is_bound<T>(&self, identifier: &Identifier<T>) -> bool {
        self.registry.contains_key(&identifier.key())
    }

    pub fn binding_kind<T>(&self, identifier: &Identifier<T>) -> Option<BindingKind> {
        self.registry
            .get(&identifier.key())
            .map(|entry| entry.binding.kind())
    }

    /// 移除本地绑定；不存在时什么也不做
    pub fn unbind<T>(&self, identifier: &Identifier<T>) -> &Self {
        if self.registry.remove(&identifier.key()).is_some() {
            debug!(
                container = %self.id,
                identifier = %identifier.name(),
                "Binding removed"
            );
        }
        self
    }

    /// 清空本地注册表
    pub fn clear(&self) {
        self.registry.clear();
        debug!(container = %self.id, "Container cleared");
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// 本地绑定名称（已排序）
    pub fn bound_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .iter()
            .map(|entry| entry.value().name.to_string())
            .collect();
        names.sort();
        names
    }

    /// 在本容器中解析 `identifier`，找不到时沿父容器链查找
    pub fn resolve<T>(&self, identifier: &Identifier<T>) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let value = self.resolve_erased(identifier.key(), &identifier.shared_name())?;
        value
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name: identifier.name().to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn try_resolve<T>(&self, identifier: &Identifier<T>) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.resolve(identifier).ok()
    }

    pub fn stats(&self) -> ContainerStats {
        self.stats.snapshot(self.registry.len())
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    fn record(&self, counter: Counter) {
        if self.config.track_stats {
            self.stats.record(counter);
        }
    }

    fn resolve_erased(&self, key: IdentifierKey, name: &Arc<str>) -> Result<ErasedValue> {
        match self.lookup(key, name)? {
            Some(value) => Ok(value),
            None => {
                self.record(Counter::NotFound);
                Err(self.not_found(name))
            }
        }
    }

    /// 沿父容器链逐级查找；`Ok(None)` 表示整条链都没有该标识符。
    /// 工厂函数或嵌套解析返回的错误原样透传。
    fn lookup(&self, key: IdentifierKey, name: &Arc<str>) -> Result<Option<ErasedValue>> {
        let mut ancestor: Option<Arc<Container>> = None;
        loop {
            let current = ancestor.as_deref().unwrap_or(self);
            current.record(Counter::Resolution);

            let registration = current
                .registry
                .get(&key)
                .map(|entry| (entry.id, entry.binding.clone()));
            if let Some((id, binding)) = registration {
                return current.resolve_binding(key, id, name, binding).map(Some);
            }

            let Some(parent) = current.parent() else {
                return Ok(None);
            };
            current.record(Counter::ParentFallback);
            trace!(container = %current.id, identifier = %name, "Falling back to parent");
            ancestor = Some(parent);
        }
    }

    fn resolve_binding(
        &self,
        key: IdentifierKey,
        id: BindingId,
        name: &Arc<str>,
        binding: Binding,
    ) -> Result<ErasedValue> {
        match binding {
            Binding::Constant(value) => Ok(value),
            Binding::Memoized {
                value: Some(value), ..
            } => {
                self.record(Counter::MemoizedHit);
                Ok(value)
            }
            Binding::Alias {
                target,
                target_name,
            } => {
                let _frame = resolution::enter(id, name, &self.config)?;
                self.record(Counter::AliasHop);
                trace!(identifier = %name, target = %target_name, "Following alias");
                self.resolve_erased(target, &target_name)
            }
            Binding::Dynamic(factory) => {
                let _frame = resolution::enter(id, name, &self.config)?;
                self.record(Counter::DynamicInvocation);
                trace!(identifier = %name, "Invoking dynamic factory");
                factory(self)
            }
            Binding::Memoized {
                factory,
                value: None,
            } => {
                let _frame = resolution::enter(id, name, &self.config)?;
                self.record(Counter::MemoizedMiss);
                trace!(identifier = %name, "Invoking memoized factory");
                let value = factory(self)?;
                Ok(self.store_memoized(key, id, value))
            }
        }
    }

    /// 仅当注册项仍是产生该值的那次绑定时才写入缓存；
    /// 期间已缓存的值优先，保证所有调用方拿到同一个值。
    fn store_memoized(&self, key: IdentifierKey, id: BindingId, value: ErasedValue) -> ErasedValue {
        let Some(mut entry) = self.registry.get_mut(&key) else {
            return value;
        };
        if entry.id != id {
            return value;
        }

        match &mut entry.binding {
            Binding::Memoized { value: cached, .. } => match cached {
                Some(existing) => Arc::clone(existing),
                None => {
                    *cached = Some(Arc::clone(&value));
                    value
                }
            },
            _ => value,
        }
    }

    fn not_found(&self, name: &str) -> ContainerError {
        let mut available = self.bound_names();
        let mut ancestor = self.parent();
        while let Some(current) = ancestor {
            available.extend(current.bound_names());
            ancestor = current.parent();
        }
        available.sort();
        available.dedup();

        let suggestion = suggest(name, &available);
        ContainerError::NotFound {
            name: name.to_string(),
            available,
            suggestion,
        }
    }
}

/// 为找不到的名称挑选一个相近的已注册名称
fn suggest(name: &str, available: &[String]) -> Option<String> {
    let lowered = name.to_lowercase();
    available
        .iter()
        .find(|candidate| candidate.as_str() == name)
        .or_else(|| {
            available
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(name))
        })
        .or_else(|| {
            available.iter().find(|candidate| {
                let candidate = candidate.to_lowercase();
                !lowered.is_empty() && (candidate.contains(&lowered) || lowered.contains(&candidate))
            })
        })
        .cloned()
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("bindings", &self.registry.len())
            .field("parent", &self.parent.read().as_ref().map(|p| p.id))
            .field("config", &self.config)
            .finish()
    }
}
