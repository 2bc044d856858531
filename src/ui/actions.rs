//! Action 枚举定义 (Intent)
//!
//! 用户交互转化为明确的语义化 Action

/// 用户操作枚举
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    MoveSelectionUp,
    MoveSelectionDown,

    // 任务
    StartAddTask,
    CyclePriority,
    ToggleSelected,
    StartDeleteTask,

    // 计时器
    ToggleTimer,
    ResetTimer,
    SelectPreset(usize),
    StartCustomDuration,

    ToggleTheme,

    // 表单/通用交互
    Cancel,      // Esc / n
    Submit,      // Enter / y
    Input(char), // 输入字符
    DeleteChar,  // Backspace
}
