//! 注册表中的绑定记录

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::Container;
use crate::errors::Result;
use crate::identifier::IdentifierKey;

/// 类型擦除后的值
pub(crate) type ErasedValue = Arc<dyn Any + Send + Sync>;

/// 类型擦除后的工厂函数
pub(crate) type ErasedFactory = Arc<dyn Fn(&Container) -> Result<ErasedValue> + Send + Sync>;

pub(crate) fn erase_factory<T, F>(factory: F) -> ErasedFactory
where
    T: Send + Sync + 'static,
    F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(move |container: &Container| {
        factory(container).map(|value| Arc::new(value) as ErasedValue)
    })
}

/// 单次注册的身份，重新绑定同一标识符会得到新的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BindingId(u64);

impl BindingId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        BindingId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// 标识符下存储的绑定策略
#[derive(Clone)]
pub(crate) enum Binding {
    /// 解析时转到同一容器中的另一个标识符
    Alias {
        target: IdentifierKey,
        target_name: Arc<str>,
    },
    Constant(ErasedValue),
    /// 每次解析都调用工厂
    Dynamic(ErasedFactory),
    /// 首次解析调用工厂并缓存结果
    Memoized {
        factory: ErasedFactory,
        value: Option<ErasedValue>,
    },
}

impl Binding {
    pub(crate) fn kind(&self) -> BindingKind {
        match self {
            Binding::Alias { .. } => BindingKind::Alias,
            Binding::Constant(_) => BindingKind::Constant,
            Binding::Dynamic(_) => BindingKind::Dynamic,
            Binding::Memoized { value, .. } => BindingKind::Memoized {
                cached: value.is_some(),
            },
        }
    }
}

/// 服务注册信息
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: BindingId,
    pub(crate) name: Arc<str>,
    pub(crate) binding: Binding,
}

/// 绑定策略的公开视图，用于内省
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Alias,
    Constant,
    Dynamic,
    /// 首次成功解析后 `cached` 变为 true
    Memoized { cached: bool },
}
