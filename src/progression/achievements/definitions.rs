//! Achievement definitions and metadata
//!
//! All achievements are defined here with their unlock rules.

use serde::{Serialize, Serializer};

/// Unique identifier for each achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementId {
    // Recipe achievements
    FirstDish,
    RecipeExpert,
    RecipeMaster,

    // Menu achievements
    MenuPlanner,

    // Quiz achievements
    QuizRookie,
    CulinaryScholar,
    Perfectionist,

    // Kitchen achievements
    StockKeeper,
    SharpEye,

    // Marketing achievements
    CampaignStarter,
    MarketingMaven,
    CrowdPleaser,

    // Community achievements
    Challenger,
    TaskMaster,

    // XP achievements
    KitchenRegular,
    SeasonedPro,
    CulinaryLegend,
}

impl AchievementId {
    /// Get the string ID for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstDish => "first_dish",
            Self::RecipeExpert => "recipe_expert",
            Self::RecipeMaster => "recipe_master",
            Self::MenuPlanner => "menu_planner",
            Self::QuizRookie => "quiz_rookie",
            Self::CulinaryScholar => "culinary_scholar",
            Self::Perfectionist => "perfectionist",
            Self::StockKeeper => "stock_keeper",
            Self::SharpEye => "sharp_eye",
            Self::CampaignStarter => "campaign_starter",
            Self::MarketingMaven => "marketing_maven",
            Self::CrowdPleaser => "crowd_pleaser",
            Self::Challenger => "challenger",
            Self::TaskMaster => "task_master",
            Self::KitchenRegular => "kitchen_regular",
            Self::SeasonedPro => "seasoned_pro",
            Self::CulinaryLegend => "culinary_legend",
        }
    }

    /// Parse from storage string
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.as_str() == s)
    }

    /// Get all achievement IDs
    pub fn all() -> &'static [AchievementId] {
        &[
            Self::FirstDish,
            Self::RecipeExpert,
            Self::RecipeMaster,
            Self::MenuPlanner,
            Self::QuizRookie,
            Self::CulinaryScholar,
            Self::Perfectionist,
            Self::StockKeeper,
            Self::SharpEye,
            Self::CampaignStarter,
            Self::MarketingMaven,
            Self::CrowdPleaser,
            Self::Challenger,
            Self::TaskMaster,
            Self::KitchenRegular,
            Self::SeasonedPro,
            Self::CulinaryLegend,
        ]
    }
}

impl Serialize for AchievementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Achievement category for grouping in a showcase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AchievementCategory {
    Recipes,
    Menus,
    Quizzes,
    Kitchen,
    Marketing,
    Community,
    Experience,
}

impl AchievementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Recipes => "Recipes",
            Self::Menus => "Menus",
            Self::Quizzes => "Quizzes",
            Self::Kitchen => "Kitchen",
            Self::Marketing => "Marketing",
            Self::Community => "Community",
            Self::Experience => "Experience",
        }
    }
}

/// What has to hold for an achievement to unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockRule {
    /// `total_xp >= threshold`
    Xp { threshold: u64 },
    /// `activity_counters[counter] >= threshold`
    Counter {
        counter: &'static str,
        threshold: u64,
    },
}

impl UnlockRule {
    pub fn threshold(&self) -> u64 {
        match self {
            Self::Xp { threshold } | Self::Counter { threshold, .. } => *threshold,
        }
    }
}

/// Achievement definition with all metadata
#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub rule: UnlockRule,
}

/// All achievement definitions
pub static ACHIEVEMENTS: &[Achievement] = &[
    // === RECIPES ===
    Achievement {
        id: AchievementId::FirstDish,
        name: "First Dish",
        description: "Generate your first recipe",
        icon: "🍳",
        category: AchievementCategory::Recipes,
        rule: UnlockRule::Counter {
            counter: "recipes_generated",
            threshold: 1,
        },
    },
    Achievement {
        id: AchievementId::RecipeExpert,
        name: "Recipe Expert",
        description: "Generate 25 recipes",
        icon: "📖",
        category: AchievementCategory::Recipes,
        rule: UnlockRule::Counter {
            counter: "recipes_generated",
            threshold: 25,
        },
    },
    Achievement {
        id: AchievementId::RecipeMaster,
        name: "Recipe Master",
        description: "Generate 100 recipes",
        icon: "👨‍🍳",
        category: AchievementCategory::Recipes,
        rule: UnlockRule::Counter {
            counter: "recipes_generated",
            threshold: 100,
        },
    },
    // === MENUS ===
    Achievement {
        id: AchievementId::MenuPlanner,
        name: "Menu Planner",
        description: "Generate 10 menus",
        icon: "🗒️",
        category: AchievementCategory::Menus,
        rule: UnlockRule::Counter {
            counter: "menus_generated",
            threshold: 10,
        },
    },
    // === QUIZZES ===
    Achievement {
        id: AchievementId::QuizRookie,
        name: "Quiz Rookie",
        description: "Complete your first quiz",
        icon: "❓",
        category: AchievementCategory::Quizzes,
        rule: UnlockRule::Counter {
            counter: "quizzes_completed",
            threshold: 1,
        },
    },
    Achievement {
        id: AchievementId::CulinaryScholar,
        name: "Culinary Scholar",
        description: "Complete 10 quizzes",
        icon: "🎓",
        category: AchievementCategory::Quizzes,
        rule: UnlockRule::Counter {
            counter: "quizzes_completed",
            threshold: 10,
        },
    },
    Achievement {
        id: AchievementId::Perfectionist,
        name: "Perfectionist",
        description: "Score 100% on 5 quizzes",
        icon: "💯",
        category: AchievementCategory::Quizzes,
        rule: UnlockRule::Counter {
            counter: "perfect_scores",
            threshold: 5,
        },
    },
    // === KITCHEN ===
    Achievement {
        id: AchievementId::StockKeeper,
        name: "Stock Keeper",
        description: "Update the inventory 50 times",
        icon: "📦",
        category: AchievementCategory::Kitchen,
        rule: UnlockRule::Counter {
            counter: "inventory_updates",
            threshold: 50,
        },
    },
    Achievement {
        id: AchievementId::SharpEye,
        name: "Sharp Eye",
        description: "Recognize 10 dishes from photos",
        icon: "📷",
        category: AchievementCategory::Kitchen,
        rule: UnlockRule::Counter {
            counter: "dishes_recognized",
            threshold: 10,
        },
    },
    // === MARKETING ===
    Achievement {
        id: AchievementId::CampaignStarter,
        name: "Campaign Starter",
        description: "Create your first marketing campaign",
        icon: "📣",
        category: AchievementCategory::Marketing,
        rule: UnlockRule::Counter {
            counter: "campaigns_created",
            threshold: 1,
        },
    },
    Achievement {
        id: AchievementId::MarketingMaven,
        name: "Marketing Maven",
        description: "Create 10 marketing campaigns",
        icon: "📈",
        category: AchievementCategory::Marketing,
        rule: UnlockRule::Counter {
            counter: "campaigns_created",
            threshold: 10,
        },
    },
    Achievement {
        id: AchievementId::CrowdPleaser,
        name: "Crowd Pleaser",
        description: "Like 10 dishes",
        icon: "❤️",
        category: AchievementCategory::Marketing,
        rule: UnlockRule::Counter {
            counter: "dishes_liked",
            threshold: 10,
        },
    },
    // === COMMUNITY ===
    Achievement {
        id: AchievementId::Challenger,
        name: "Challenger",
        description: "Submit an entry to a cooking challenge",
        icon: "🏁",
        category: AchievementCategory::Community,
        rule: UnlockRule::Counter {
            counter: "challenges_submitted",
            threshold: 1,
        },
    },
    Achievement {
        id: AchievementId::TaskMaster,
        name: "Task Master",
        description: "Complete 10 daily or weekly tasks",
        icon: "✅",
        category: AchievementCategory::Community,
        rule: UnlockRule::Counter {
            counter: "tasks_completed",
            threshold: 10,
        },
    },
    // === EXPERIENCE ===
    Achievement {
        id: AchievementId::KitchenRegular,
        name: "Kitchen Regular",
        description: "Earn 500 XP",
        icon: "⭐",
        category: AchievementCategory::Experience,
        rule: UnlockRule::Xp { threshold: 500 },
    },
    Achievement {
        id: AchievementId::SeasonedPro,
        name: "Seasoned Pro",
        description: "Earn 2,500 XP",
        icon: "🌟",
        category: AchievementCategory::Experience,
        rule: UnlockRule::Xp { threshold: 2_500 },
    },
    Achievement {
        id: AchievementId::CulinaryLegend,
        name: "Culinary Legend",
        description: "Earn 10,000 XP",
        icon: "🏆",
        category: AchievementCategory::Experience,
        rule: UnlockRule::Xp { threshold: 10_000 },
    },
];

impl Achievement {
    /// Get achievement definition by ID
    pub fn get(id: AchievementId) -> Option<&'static Achievement> {
        ACHIEVEMENTS.iter().find(|a| a.id == id)
    }

    /// Get total number of achievements
    pub fn total_count() -> usize {
        ACHIEVEMENTS.len()
    }
}
