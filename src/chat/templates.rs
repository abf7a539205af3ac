//! Quick-prompt catalogue shown above the conversation.
//!
//! Templates are static data. Picking one only seeds the draft input.

use serde::Serialize;

/// Visual family of a template (drives the icon in the widget).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    /// Content calendars and layouts.
    Layout,
    /// Colour and identity systems.
    Palette,
    /// Logos and standout concepts.
    Sparkle,
    /// Video and motion briefs.
    Video,
}

/// A predefined request used to pre-fill the draft input.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct QuickPromptTemplate {
    /// Short card title.
    pub title: &'static str,
    /// One-line card description.
    pub description: &'static str,
    /// Text copied into the draft when selected.
    pub prompt: &'static str,
    /// Icon family.
    pub category: TemplateCategory,
}

/// Draft text present when a session opens.
pub const INITIAL_DRAFT: &str = "مرحباً BrandFlow، أحتاج مساعدتك لتلخيص قدراتك وكيف يمكن أن ندير مشروع تصميم من البداية للنهاية.";

/// Prompt sent by the "Flow" demo button.
pub const FLOW_DEMO_PROMPT: &str =
    "استعرض سير العمل الكامل لإنشاء هوية بصرية من الاجتماع الأول حتى التسليم النهائي.";

/// All templates, in display order.
pub static QUICK_PROMPTS: [QuickPromptTemplate; 4] = [
    QuickPromptTemplate {
        title: "خطة محتوى ٧ أيام",
        description: "أفكار بوستات وإنفوجرافيك مع نسخ عربية وإنجليزية.",
        prompt: "أريد خطة محتوى لمدة 7 أيام لمنصة إنستجرام لعلامة متخصصة في منتجات العناية بالبشرة. قدم أفكار منشورات، الصياغة بالعربية والإنجليزية، ألوان مقترحة، ونمط تصميم لكل يوم.",
        category: TemplateCategory::Layout,
    },
    QuickPromptTemplate {
        title: "هوية بصرية كاملة",
        description: "ألوان، خطوط، نبرة الصوت، استخدام الصور والأيقونات.",
        prompt: "صمم هوية بصرية كاملة لمطعم مأكولات صحية. حدد لوحة الألوان، الخطوط الأساسية والفرعية، أسلوب التصوير، أشكال الأيقونات، نبرة المحتوى، وقدم نموذج كتيب دليل استخدام.",
        category: TemplateCategory::Palette,
    },
    QuickPromptTemplate {
        title: "شعار مميز",
        description: "أشكال مقترحة، معاني، استخدامات متعددة.",
        prompt: "صمم عدة أفكار لشعار مبتكر لمنصة تعليم إلكتروني تستهدف الشباب. قدم وصفًا بصريًا، ودلالات الألوان، وطرق الاستخدام على ملفات تعريف اجتماعية وورق رسمي.",
        category: TemplateCategory::Sparkle,
    },
    QuickPromptTemplate {
        title: "فيديو إعلان",
        description: "ستوري بورد، سكريبت، اقتراحات موشن وجرافيك.",
        prompt: "أحتاج فيديو إعلان لمدة 30 ثانية لإطلاق تطبيق لخدمات تنظيم الوقت. قدم ستوري بورد، سكريبت صوتي، أسلوب موشن جرافيك، واقتراحات صوتيات وموسيقى.",
        category: TemplateCategory::Video,
    },
];
